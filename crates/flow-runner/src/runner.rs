//! Flow runner implementation

use std::sync::Arc;
use std::time::{Duration, Instant};

use action_runner::{ActionRunner, DefaultActionRunner};
use pagevet_core_types::{StepKind, StepResult, StepSpec, StepStatus};
use selector_resolver::DefaultSelectorResolver;
use serde::{Deserialize, Serialize};
use session_driver::SessionDriver;
use state_verifier::{DefaultStateVerifier, StateVerifier};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::errors::FlowError;
use crate::report::{FinalizedReport, NullSink, ReportSink, RunReport};

/// Delay between checkpoint re-verifications
const CHECKPOINT_RETRY_DELAY_MS: u64 = 250;

/// Flow lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowState {
    /// Authored but not yet started
    Pending,

    /// Steps are executing
    Running,

    /// Every step executed; no fatal failure occurred
    Completed,

    /// A fatal step failed; remaining steps never executed
    Aborted,
}

impl FlowState {
    /// Get state name as string
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Pending => "pending",
            FlowState::Running => "running",
            FlowState::Completed => "completed",
            FlowState::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Completed | FlowState::Aborted)
    }
}

/// Orchestrates an ordered sequence of steps against one driver
///
/// Collaborators are injected; the defaults wire the whole engine together
/// with stock components and a null report sink.
pub struct FlowRunner {
    action_runner: Arc<dyn ActionRunner>,
    verifier: Arc<dyn StateVerifier>,
    sink: Arc<dyn ReportSink>,
}

impl FlowRunner {
    /// Runner with default collaborators and no report sink
    pub fn new() -> Self {
        Self {
            action_runner: Arc::new(DefaultActionRunner::new(Arc::new(
                DefaultSelectorResolver::new(),
            ))),
            verifier: Arc::new(DefaultStateVerifier::new()),
            sink: Arc::new(NullSink),
        }
    }

    pub fn with_action_runner(mut self, action_runner: Arc<dyn ActionRunner>) -> Self {
        self.action_runner = action_runner;
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn StateVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Execute the steps in declaration order.
    ///
    /// Non-fatal failures do not stop the flow; a fatal failure aborts the
    /// remainder. On every path that started executing, the report is
    /// finalized exactly once and delivered to the sink before this method
    /// returns; a fatal abort returns the finalized report inside
    /// [`FlowError::FatalStep`] so the caller receives both the terminal
    /// cause and the complete report.
    pub async fn execute(
        &self,
        steps: &[StepSpec],
        driver: &dyn SessionDriver,
    ) -> Result<FinalizedReport, FlowError> {
        validate_steps(steps)?;

        let mut state = FlowState::Running;
        let mut report = RunReport::begin();
        info!(run_id = %report.run_id(), steps = steps.len(), "Flow run started");

        let mut terminal: Option<(String, String)> = None;

        for (index, step) in steps.iter().enumerate() {
            debug!(step = %step.name, index, kind = ?step.kind, "Dispatching step");

            let result = match step.kind {
                StepKind::Action => match self.action_runner.run(step, driver).await {
                    Ok(result) => result,
                    Err(err) => {
                        // Dispatch and validation disagree; still finalize
                        // and deliver what was collected before bailing
                        warn!(step = %step.name, error = %err, "Step dispatch failed");
                        self.finalize(report, FlowState::Aborted).await;
                        return Err(FlowError::Internal {
                            step: step.name.clone(),
                            reason: err.to_string(),
                        });
                    }
                },
                StepKind::Checkpoint => self.run_checkpoint(step, driver).await,
            };

            let fatal_failure = result.status == StepStatus::FailedFatal;
            if fatal_failure {
                terminal = Some((step.name.clone(), result.evidence.clone()));
            }
            report.record(result);

            if fatal_failure {
                warn!(step = %step.name, "Fatal step failed, aborting flow");
                state = FlowState::Aborted;
                break;
            }
        }

        if state != FlowState::Aborted {
            state = FlowState::Completed;
        }
        let finalized = self.finalize(report, state).await;

        match terminal {
            Some((step, reason)) => Err(FlowError::FatalStep {
                step,
                reason,
                report: Box::new(finalized),
            }),
            None => Ok(finalized),
        }
    }

    /// Finalize exactly once and hand the report to the sink
    async fn finalize(&self, report: RunReport, state: FlowState) -> FinalizedReport {
        let finalized = report.finalize(state);
        info!(
            run_id = %finalized.run_id,
            state = state.name(),
            passed = finalized.passed_count,
            failed = finalized.failed_count,
            "Flow run finalized"
        );
        self.sink.deliver(&finalized).await;
        finalized
    }

    /// Evaluate a checkpoint step, re-verifying up to the step's retry budget
    async fn run_checkpoint(&self, step: &StepSpec, driver: &dyn SessionDriver) -> StepResult {
        let started = Instant::now();
        let allowed = step.retries.saturating_add(1);
        let mut attempt = 1u32;

        loop {
            let verdict = self
                .verifier
                .verify(driver, &step.heuristics, &step.negative_indicators)
                .await;
            let evidence = verdict.evidence_line();

            if verdict.loaded {
                let latency_ms = started.elapsed().as_millis() as u64;
                info!(step = %step.name, attempt, score = verdict.score, "Checkpoint passed");
                return StepResult::new(step.name.as_str(), StepStatus::Passed)
                    .with_attempts(attempt)
                    .with_evidence(evidence)
                    .with_latency(latency_ms);
            }

            if attempt >= allowed {
                let status = if step.fatal {
                    StepStatus::FailedFatal
                } else {
                    StepStatus::FailedRetryable
                };
                let screenshot = match driver.capture_evidence().await {
                    Ok(reference) => reference,
                    Err(err) => {
                        warn!(step = %step.name, error = %err, "Evidence capture failed");
                        None
                    }
                };
                warn!(
                    step = %step.name,
                    attempts = attempt,
                    status = status.name(),
                    "Checkpoint failed"
                );
                return StepResult::new(step.name.as_str(), status)
                    .with_attempts(attempt)
                    .with_evidence(evidence)
                    .with_latency(started.elapsed().as_millis() as u64)
                    .with_screenshot(screenshot);
            }

            debug!(step = %step.name, attempt, "Checkpoint not loaded, re-verifying");
            sleep(Duration::from_millis(CHECKPOINT_RETRY_DELAY_MS)).await;
            attempt += 1;
        }
    }
}

impl Default for FlowRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural validation before any driver traffic
fn validate_steps(steps: &[StepSpec]) -> Result<(), FlowError> {
    if steps.is_empty() {
        return Err(FlowError::Validation("step list is empty".to_string()));
    }

    for step in steps {
        if step.name.is_empty() {
            return Err(FlowError::Validation("step name cannot be empty".to_string()));
        }
        if step.timeout_ms == 0 {
            return Err(FlowError::Validation(format!(
                "step '{}' has a zero timeout",
                step.name
            )));
        }

        match step.kind {
            StepKind::Action => {
                if step.candidates.is_empty() {
                    return Err(FlowError::Validation(format!(
                        "action step '{}' has no selector candidates",
                        step.name
                    )));
                }
                if step.payload.is_none() {
                    return Err(FlowError::Validation(format!(
                        "action step '{}' has no payload",
                        step.name
                    )));
                }
            }
            StepKind::Checkpoint => {
                if step.heuristics.is_empty() {
                    return Err(FlowError::Validation(format!(
                        "checkpoint step '{}' has no heuristics",
                        step.name
                    )));
                }
            }
        }

        for heuristic in step.heuristics.iter().chain(step.negative_indicators.iter()) {
            if heuristic.weight == 0 {
                return Err(FlowError::Validation(format!(
                    "step '{}': heuristic '{}' has zero weight",
                    step.name, heuristic.description
                )));
            }
        }
    }

    Ok(())
}
