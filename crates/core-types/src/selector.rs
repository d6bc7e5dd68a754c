//! Selector candidates - the ordered fallback vocabulary for element location

use serde::{Deserialize, Serialize};

/// Selector strategy enumeration
///
/// Two families of expressions are supported:
/// - PathExpression: XPath-style path expressions
/// - AttributeQuery: CSS-style attribute queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorStrategy {
    /// XPath-style path expression
    PathExpression,

    /// CSS-style attribute query
    AttributeQuery,
}

impl SelectorStrategy {
    /// Get strategy name as string
    pub fn name(&self) -> &'static str {
        match self {
            SelectorStrategy::PathExpression => "xpath",
            SelectorStrategy::AttributeQuery => "css",
        }
    }
}

/// Readiness condition a located element must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetCondition {
    /// Element exists in the document
    Present,

    /// Element exists and is rendered visible
    Visible,

    /// Element is visible and enabled for interaction
    Clickable,
}

impl TargetCondition {
    /// Get condition name as string
    pub fn name(&self) -> &'static str {
        match self {
            TargetCondition::Present => "present",
            TargetCondition::Visible => "visible",
            TargetCondition::Clickable => "clickable",
        }
    }
}

/// One way of locating a UI element
///
/// Candidates are authored per element and tried first-to-last; ordering is
/// significant. Immutable once authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorCandidate {
    /// Expression family
    pub strategy: SelectorStrategy,

    /// The selector expression itself
    pub expression: String,

    /// Condition the element must satisfy before the candidate counts as a hit
    pub condition: TargetCondition,
}

impl SelectorCandidate {
    pub fn new(
        strategy: SelectorStrategy,
        expression: impl Into<String>,
        condition: TargetCondition,
    ) -> Self {
        Self {
            strategy,
            expression: expression.into(),
            condition,
        }
    }

    /// Path-expression candidate
    pub fn xpath(expression: impl Into<String>, condition: TargetCondition) -> Self {
        Self::new(SelectorStrategy::PathExpression, expression, condition)
    }

    /// Attribute-query candidate
    pub fn css(expression: impl Into<String>, condition: TargetCondition) -> Self {
        Self::new(SelectorStrategy::AttributeQuery, expression, condition)
    }

    /// String form for logs and evidence
    pub fn describe(&self) -> String {
        format!(
            "{}:{} [{}]",
            self.strategy.name(),
            self.expression,
            self.condition.name()
        )
    }
}
