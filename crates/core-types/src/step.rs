//! Step specifications and step results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::ActionPayload;
use crate::heuristic::Heuristic;
use crate::selector::SelectorCandidate;

/// Default per-step timeout budget in milliseconds
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 5_000;

/// Step kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// Resolve an element and act on it
    Action,

    /// Verify the flow reached an expected state
    Checkpoint,
}

/// One unit of work in a flow
///
/// Authored by the caller before a run starts; read-only during execution.
/// `fatal = true` means failure aborts the remaining flow. Fatality is an
/// explicit authoring decision and defaults to `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSpec {
    /// Step name, quoted in results and logs
    pub name: String,

    /// Step kind
    pub kind: StepKind,

    /// Ordered selector candidates (Action steps; must be non-empty)
    pub candidates: Vec<SelectorCandidate>,

    /// What to do with the resolved element (Action steps)
    pub payload: Option<ActionPayload>,

    /// Positive signals (Checkpoint steps; must be non-empty)
    pub heuristics: Vec<Heuristic>,

    /// Veto signals, e.g. "an error banner is visible" (Checkpoint steps)
    pub negative_indicators: Vec<Heuristic>,

    /// Per-step timeout budget in milliseconds
    pub timeout_ms: u64,

    /// Additional attempts after the first failure
    pub retries: u32,

    /// Abort the remaining flow when this step fails
    pub fatal: bool,
}

impl StepSpec {
    /// New action step with default timeout, no retries, non-fatal
    pub fn action(
        name: impl Into<String>,
        candidates: Vec<SelectorCandidate>,
        payload: ActionPayload,
    ) -> Self {
        Self {
            name: name.into(),
            kind: StepKind::Action,
            candidates,
            payload: Some(payload),
            heuristics: Vec::new(),
            negative_indicators: Vec::new(),
            timeout_ms: DEFAULT_STEP_TIMEOUT_MS,
            retries: 0,
            fatal: false,
        }
    }

    /// New checkpoint step with default timeout, no retries, non-fatal
    pub fn checkpoint(name: impl Into<String>, heuristics: Vec<Heuristic>) -> Self {
        Self {
            name: name.into(),
            kind: StepKind::Checkpoint,
            candidates: Vec::new(),
            payload: None,
            heuristics,
            negative_indicators: Vec::new(),
            timeout_ms: DEFAULT_STEP_TIMEOUT_MS,
            retries: 0,
            fatal: false,
        }
    }

    /// Set veto signals for a checkpoint
    pub fn with_negative_indicators(mut self, indicators: Vec<Heuristic>) -> Self {
        self.negative_indicators = indicators;
        self
    }

    /// Set the timeout budget
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the retry budget
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Mark the step fatal (its failure aborts the remaining flow)
    pub fn fatal(mut self, fatal: bool) -> Self {
        self.fatal = fatal;
        self
    }
}

/// Step outcome enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    /// The step completed
    Passed,

    /// The step failed after exhausting its retries; the flow continues
    FailedRetryable,

    /// A fatal step failed; the flow aborts after this result
    FailedFatal,

    /// Reserved for report consumers that pre-filter steps. The runner never
    /// emits this: steps after a fatal abort simply produce no result.
    Skipped,
}

impl StepStatus {
    /// Whether this status counts as a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, StepStatus::FailedRetryable | StepStatus::FailedFatal)
    }

    /// Get status name as string
    pub fn name(&self) -> &'static str {
        match self {
            StepStatus::Passed => "passed",
            StepStatus::FailedRetryable => "failed-retryable",
            StepStatus::FailedFatal => "failed-fatal",
            StepStatus::Skipped => "skipped",
        }
    }
}

/// Outcome of one executed step
///
/// Created once per executed step and immutable after creation; the run
/// report is an append-only log of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Name of the step spec that produced this result
    pub step_name: String,

    /// Outcome
    pub status: StepStatus,

    /// Tries made: 1 + retries used
    pub attempts: u32,

    /// What happened, in terms a report reader can act on
    pub evidence: String,

    /// When the result was created
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Wall-clock time the step took
    pub latency_ms: u64,

    /// Reference to captured evidence (e.g. a screenshot), if any
    pub screenshot_ref: Option<String>,
}

impl StepResult {
    pub fn new(step_name: impl Into<String>, status: StepStatus) -> Self {
        Self {
            step_name: step_name.into(),
            status,
            attempts: 1,
            evidence: String::new(),
            timestamp: Utc::now(),
            latency_ms: 0,
            screenshot_ref: None,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = evidence.into();
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_screenshot(mut self, screenshot_ref: Option<String>) -> Self {
        self.screenshot_ref = screenshot_ref;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::TargetCondition;

    #[test]
    fn test_action_step_defaults() {
        let step = StepSpec::action(
            "open-menu",
            vec![SelectorCandidate::css("#menu", TargetCondition::Clickable)],
            ActionPayload::Click,
        );

        assert_eq!(step.kind, StepKind::Action);
        assert_eq!(step.timeout_ms, DEFAULT_STEP_TIMEOUT_MS);
        assert_eq!(step.retries, 0);
        assert!(!step.fatal);
        assert!(step.heuristics.is_empty());
    }

    #[test]
    fn test_checkpoint_builder_chain() {
        let step = StepSpec::checkpoint("menu-open", vec![Heuristic::url_contains("/menu", 1)])
            .with_negative_indicators(vec![Heuristic::element_present(
                SelectorCandidate::css(".error-banner", TargetCondition::Visible),
                1,
            )])
            .with_timeout(2_000)
            .with_retries(2)
            .fatal(true);

        assert_eq!(step.kind, StepKind::Checkpoint);
        assert_eq!(step.timeout_ms, 2_000);
        assert_eq!(step.retries, 2);
        assert!(step.fatal);
        assert_eq!(step.negative_indicators.len(), 1);
    }

    #[test]
    fn test_step_spec_survives_json() {
        let step = StepSpec::action(
            "sign-in",
            vec![
                SelectorCandidate::xpath("//button[text()='Go']", TargetCondition::Clickable),
                SelectorCandidate::css("button[type=submit]", TargetCondition::Clickable),
            ],
            ActionPayload::set_text("user@example.com"),
        )
        .with_retries(1);

        let json = serde_json::to_string(&step).unwrap();
        let back: StepSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "sign-in");
        assert_eq!(back.candidates.len(), 2);
        assert_eq!(back.retries, 1);
    }

    #[test]
    fn test_skipped_is_not_a_failure() {
        assert!(!StepStatus::Skipped.is_failure());
        assert!(!StepStatus::Passed.is_failure());
        assert!(StepStatus::FailedRetryable.is_failure());
        assert!(StepStatus::FailedFatal.is_failure());
    }
}
