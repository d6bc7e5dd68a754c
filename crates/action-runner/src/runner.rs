//! Action runner implementation

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pagevet_core_types::{ActionPayload, StepKind, StepResult, StepSpec, StepStatus};
use selector_resolver::{ResolvedElement, SelectorResolver};
use session_driver::SessionDriver;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::errors::ActionError;
use crate::mitigation::MitigationPolicy;

/// Base backoff between action retries
const RETRY_BACKOFF_BASE_MS: u64 = 250;

/// Backoff cap
const RETRY_BACKOFF_CAP_MS: u64 = 5_000;

/// Action runner trait
#[async_trait]
pub trait ActionRunner: Send + Sync {
    /// Run one Action step to a structured result.
    ///
    /// Runtime failures (resolution, blocked interaction, driver faults)
    /// never escape as errors: they are folded into the result's status and
    /// evidence. `Err` is reserved for structural misuse the flow validator
    /// rules out up front (wrong kind, missing payload).
    async fn run(
        &self,
        step: &StepSpec,
        driver: &dyn SessionDriver,
    ) -> Result<StepResult, ActionError>;
}

/// Default action runner implementation
pub struct DefaultActionRunner {
    resolver: Arc<dyn SelectorResolver>,
    mitigation: MitigationPolicy,
}

impl DefaultActionRunner {
    pub fn new(resolver: Arc<dyn SelectorResolver>) -> Self {
        Self {
            resolver,
            mitigation: MitigationPolicy::default(),
        }
    }

    pub fn with_mitigation(mut self, policy: MitigationPolicy) -> Self {
        self.mitigation = policy;
        self
    }
}

#[async_trait]
impl ActionRunner for DefaultActionRunner {
    async fn run(
        &self,
        step: &StepSpec,
        driver: &dyn SessionDriver,
    ) -> Result<StepResult, ActionError> {
        if step.kind != StepKind::Action {
            return Err(ActionError::WrongKind(step.name.clone()));
        }
        let payload = step
            .payload
            .as_ref()
            .ok_or_else(|| ActionError::MissingPayload(step.name.clone()))?;

        let started = Instant::now();
        let allowed = step.retries.saturating_add(1);
        let mut attempt = 1u32;
        let mut last_error;

        loop {
            info!(step = %step.name, attempt, "Executing action step");
            match self.try_once(step, payload, driver).await {
                Ok(resolved) => {
                    let latency_ms = started.elapsed().as_millis() as u64;
                    let evidence = format!(
                        "{} via candidate #{} {} in {}ms",
                        payload.describe(),
                        resolved.candidate_index + 1,
                        resolved.candidate.describe(),
                        latency_ms,
                    );
                    info!(step = %step.name, attempt, latency_ms, "Action step passed");
                    return Ok(StepResult::new(step.name.as_str(), StepStatus::Passed)
                        .with_attempts(attempt)
                        .with_evidence(evidence)
                        .with_latency(latency_ms));
                }
                Err(err) => {
                    warn!(step = %step.name, attempt, error = %err, "Action attempt failed");
                    last_error = err;
                }
            }

            if attempt >= allowed {
                break;
            }
            let backoff = retry_backoff(attempt);
            debug!(
                step = %step.name,
                backoff_ms = backoff.as_millis() as u64,
                "Backing off before retry"
            );
            sleep(backoff).await;
            attempt += 1;
        }

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
        let latency_ms = started.elapsed().as_millis() as u64;
        warn!(
            step = %step.name,
            attempts = attempt,
            status = status.name(),
            "Action step failed"
        );
        Ok(StepResult::new(step.name.as_str(), status)
            .with_attempts(attempt)
            .with_evidence(format!("{} attempts exhausted: {}", attempt, last_error))
            .with_latency(latency_ms)
            .with_screenshot(screenshot))
    }
}

impl DefaultActionRunner {
    /// One resolve-and-act attempt, with overlay mitigation on interception
    async fn try_once(
        &self,
        step: &StepSpec,
        payload: &ActionPayload,
        driver: &dyn SessionDriver,
    ) -> Result<ResolvedElement, ActionError> {
        let resolved = self
            .resolver
            .resolve(driver, &step.candidates, step.timeout_ms)
            .await?;
        debug!(
            step = %step.name,
            candidate = %resolved.candidate.describe(),
            "Element resolved"
        );

        let mut passes = 0u32;
        loop {
            match driver.act(&resolved.snapshot.handle, payload).await {
                Ok(()) => return Ok(resolved),
                Err(err) if err.is_interaction_blocked() => {
                    if passes >= self.mitigation.max_passes {
                        return Err(ActionError::Blocked {
                            passes,
                            reason: err.to_string(),
                        });
                    }
                    passes += 1;
                    warn!(
                        step = %step.name,
                        pass = passes,
                        error = %err,
                        "Interaction intercepted, dismissing overlays"
                    );
                    self.dismiss_overlays(driver).await;
                }
                Err(err) => return Err(ActionError::Driver(err.to_string())),
            }
        }
    }

    /// Query the known overlay candidates and click closed the ones present
    async fn dismiss_overlays(&self, driver: &dyn SessionDriver) {
        for overlay in &self.mitigation.overlays {
            match driver.query(overlay).await {
                Ok(Some(snapshot)) if snapshot.satisfies(overlay.condition) => {
                    debug!(overlay = %overlay.describe(), "Dismissing overlay");
                    if let Err(err) = driver.act(&snapshot.handle, &ActionPayload::Click).await {
                        warn!(
                            overlay = %overlay.describe(),
                            error = %err,
                            "Overlay dismissal failed"
                        );
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(overlay = %overlay.describe(), error = %err, "Overlay query failed");
                }
            }
        }
    }
}

/// Capped exponential backoff: base * 2^(attempt-1)
fn retry_backoff(attempt: u32) -> Duration {
    let multiplier = 2u64.saturating_pow(attempt.saturating_sub(1));
    let total_ms = RETRY_BACKOFF_BASE_MS.saturating_mul(multiplier);
    Duration::from_millis(total_ms.min(RETRY_BACKOFF_CAP_MS))
}
