//! Verification heuristics - weak, independent page-state signals
//!
//! A single signal (URL fragment, marker element, title) is not reliable on
//! its own in this domain; checkpoints OR several weighted signals together
//! and let negative indicators veto. Probes are a closed data vocabulary
//! rather than bare closures so flows serialize and probes stay read-only.

use serde::{Deserialize, Serialize};

use crate::selector::SelectorCandidate;

/// Read-only probe against current session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HeuristicProbe {
    /// Current URL contains the fragment
    UrlContains(String),

    /// Current URL equals the string exactly
    UrlEquals(String),

    /// Page title contains the fragment
    TitleContains(String),

    /// An element matching the candidate is present (and satisfies its condition)
    ElementPresent(SelectorCandidate),

    /// No element matching the candidate satisfies its condition
    ElementAbsent(SelectorCandidate),
}

/// One weighted signal used in combination with others to infer flow state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heuristic {
    /// Human-readable description, quoted verbatim in verdict evidence
    pub description: String,

    /// Contribution to the positive score when the probe holds; must be > 0
    pub weight: u32,

    /// The probe itself
    pub probe: HeuristicProbe,
}

impl Heuristic {
    pub fn new(description: impl Into<String>, weight: u32, probe: HeuristicProbe) -> Self {
        Self {
            description: description.into(),
            weight,
            probe,
        }
    }

    /// "URL contains fragment" signal
    pub fn url_contains(fragment: impl Into<String>, weight: u32) -> Self {
        let fragment = fragment.into();
        Self::new(
            format!("url contains '{}'", fragment),
            weight,
            HeuristicProbe::UrlContains(fragment),
        )
    }

    /// "title contains fragment" signal
    pub fn title_contains(fragment: impl Into<String>, weight: u32) -> Self {
        let fragment = fragment.into();
        Self::new(
            format!("title contains '{}'", fragment),
            weight,
            HeuristicProbe::TitleContains(fragment),
        )
    }

    /// "page-specific marker is present" signal
    pub fn element_present(candidate: SelectorCandidate, weight: u32) -> Self {
        Self::new(
            format!("element present: {}", candidate.describe()),
            weight,
            HeuristicProbe::ElementPresent(candidate),
        )
    }

    /// "previous-page marker is gone" signal
    pub fn element_absent(candidate: SelectorCandidate, weight: u32) -> Self {
        Self::new(
            format!("element absent: {}", candidate.describe()),
            weight,
            HeuristicProbe::ElementAbsent(candidate),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::TargetCondition;

    #[test]
    fn test_convenience_constructors_describe_themselves() {
        let h = Heuristic::url_contains("/dashboard", 2);
        assert_eq!(h.description, "url contains '/dashboard'");
        assert_eq!(h.weight, 2);
        assert_eq!(h.probe, HeuristicProbe::UrlContains("/dashboard".to_string()));

        let marker = SelectorCandidate::css("#login-form", TargetCondition::Present);
        let h = Heuristic::element_absent(marker.clone(), 1);
        assert_eq!(h.probe, HeuristicProbe::ElementAbsent(marker));
    }
}
