//! Append-only run report and finalization

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagevet_core_types::{RunId, StepResult, StepStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::runner::FlowState;

/// In-progress run report, owned by the runner for the duration of one run
///
/// Step results are append-only: once recorded they are never mutated or
/// removed, which keeps the log replayable and auditable.
#[derive(Debug)]
pub struct RunReport {
    run_id: RunId,
    started_at: DateTime<Utc>,
    steps: Vec<StepResult>,
}

impl RunReport {
    /// Start an empty report stamped with a fresh run id
    pub fn begin() -> Self {
        Self {
            run_id: RunId::new(),
            started_at: Utc::now(),
            steps: Vec::new(),
        }
    }

    /// Append one step result
    pub fn record(&mut self, result: StepResult) {
        self.steps.push(result);
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Consume the accumulator into an immutable finalized report.
    ///
    /// Pure aggregation, no I/O. Finalization happens exactly once; the
    /// accumulator is gone afterwards.
    pub fn finalize(self, state: FlowState) -> FinalizedReport {
        let finished_at = Utc::now();
        let duration_ms = (finished_at - self.started_at).num_milliseconds().max(0) as u64;
        let passed_count = self
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Passed)
            .count();
        let failed_count = self.steps.iter().filter(|s| s.status.is_failure()).count();
        let overall_success = self
            .steps
            .iter()
            .all(|s| s.status != StepStatus::FailedFatal);

        FinalizedReport {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at,
            duration_ms,
            state,
            steps: self.steps,
            passed_count,
            failed_count,
            overall_success,
        }
    }
}

/// Immutable finalized report handed to the caller and its sink
///
/// The engine guarantees the structure is correct and complete; where it
/// ends up (file, console, external system) is the caller's decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizedReport {
    pub run_id: RunId,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub finished_at: DateTime<Utc>,

    pub duration_ms: u64,

    /// Terminal state of the run
    pub state: FlowState,

    /// Step results in declaration order
    pub steps: Vec<StepResult>,

    pub passed_count: usize,

    pub failed_count: usize,

    /// True iff no step failed fatally. Non-fatal failures are reported but
    /// do not flip this flag.
    pub overall_success: bool,
}

impl FinalizedReport {
    /// Pass rate over executed steps (0.0 when nothing executed)
    pub fn pass_rate(&self) -> f64 {
        if self.steps.is_empty() {
            0.0
        } else {
            self.passed_count as f64 / self.steps.len() as f64
        }
    }

    /// JSON-serializable structure for whatever sink the caller chooses
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Human-readable run summary
    pub fn summary(&self) -> String {
        let mut out = format!(
            "run {} [{}] {} steps: {} passed, {} failed ({:.0}% pass rate), overall success: {}\n",
            self.run_id,
            self.state.name(),
            self.steps.len(),
            self.passed_count,
            self.failed_count,
            self.pass_rate() * 100.0,
            self.overall_success,
        );
        for step in &self.steps {
            out.push_str(&format!(
                "  [{}] {} (attempts: {}) {}\n",
                step.status.name(),
                step.step_name,
                step.attempts,
                step.evidence,
            ));
        }
        out
    }
}

/// Destination for finalized reports
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, report: &FinalizedReport);
}

/// Discards reports; the default when the caller only consumes the return
/// value of `execute`
pub struct NullSink;

#[async_trait]
impl ReportSink for NullSink {
    async fn deliver(&self, _report: &FinalizedReport) {}
}

/// Logs the report summary through `tracing`
pub struct TracingSink;

#[async_trait]
impl ReportSink for TracingSink {
    async fn deliver(&self, report: &FinalizedReport) {
        info!(run_id = %report.run_id, "{}", report.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, status: StepStatus) -> StepResult {
        StepResult::new(name, status).with_evidence("test evidence")
    }

    #[test]
    fn test_finalize_counts_and_success() {
        let mut report = RunReport::begin();
        report.record(result("one", StepStatus::Passed));
        report.record(result("two", StepStatus::FailedRetryable));
        report.record(result("three", StepStatus::Passed));

        let finalized = report.finalize(FlowState::Completed);

        assert_eq!(finalized.passed_count, 2);
        assert_eq!(finalized.failed_count, 1);
        assert_eq!(finalized.passed_count + finalized.failed_count, finalized.steps.len());
        // Only a fatal failure flips overall success
        assert!(finalized.overall_success);
        assert!((finalized.pass_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fatal_failure_flips_overall_success() {
        let mut report = RunReport::begin();
        report.record(result("one", StepStatus::Passed));
        report.record(result("two", StepStatus::FailedFatal));

        let finalized = report.finalize(FlowState::Aborted);

        assert!(!finalized.overall_success);
        assert_eq!(finalized.state, FlowState::Aborted);
    }

    #[test]
    fn test_results_keep_declaration_order() {
        let mut report = RunReport::begin();
        for name in ["a", "b", "c"] {
            report.record(result(name, StepStatus::Passed));
        }

        let finalized = report.finalize(FlowState::Completed);
        let names: Vec<&str> = finalized
            .steps
            .iter()
            .map(|s| s.step_name.as_str())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_json_shape_carries_counts_and_steps() {
        let mut report = RunReport::begin();
        report.record(result("only", StepStatus::Passed));
        let finalized = report.finalize(FlowState::Completed);

        let json = finalized.to_json();
        assert_eq!(json["passed_count"], 1);
        assert_eq!(json["failed_count"], 0);
        assert_eq!(json["steps"][0]["step_name"], "only");
        assert_eq!(json["overall_success"], true);
    }

    #[test]
    fn test_summary_mentions_each_step() {
        let mut report = RunReport::begin();
        report.record(result("open-menu", StepStatus::Passed));
        report.record(result("menu-open", StepStatus::FailedRetryable));
        let finalized = report.finalize(FlowState::Completed);

        let summary = finalized.summary();
        assert!(summary.contains("open-menu"));
        assert!(summary.contains("menu-open"));
        assert!(summary.contains("1 passed, 1 failed"));
    }

    #[test]
    fn test_empty_report_pass_rate_is_zero() {
        let report = RunReport::begin();
        let finalized = report.finalize(FlowState::Completed);
        assert_eq!(finalized.pass_rate(), 0.0);
        assert!(finalized.overall_success);
    }
}
