//! Element resolver with budget-shared fallback chain

use std::time::{Duration, Instant};

use async_trait::async_trait;
use pagevet_core_types::SelectorCandidate;
use session_driver::{ElementSnapshot, SessionDriver};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::errors::ResolveError;
use crate::types::{CandidateAttempt, ResolvedElement};

/// Default polling cadence while a candidate window is open
const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Element resolver trait
#[async_trait]
pub trait SelectorResolver: Send + Sync {
    /// Resolve the first candidate whose condition is satisfied within the
    /// shared timeout budget
    async fn resolve(
        &self,
        driver: &dyn SessionDriver,
        candidates: &[SelectorCandidate],
        timeout_budget_ms: u64,
    ) -> Result<ResolvedElement, ResolveError>;
}

/// Default resolver implementation
///
/// The budget is divided among candidates in order: each candidate's window
/// is `remaining_budget / remaining_candidate_count`, so a fast-failing
/// early candidate leaves its unused share to the later ones and no
/// candidate starves. An early hit returns immediately without consuming
/// the rest of the budget.
pub struct DefaultSelectorResolver {
    /// Poll cadence within a candidate's window
    poll_interval: Duration,
}

impl DefaultSelectorResolver {
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for DefaultSelectorResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SelectorResolver for DefaultSelectorResolver {
    async fn resolve(
        &self,
        driver: &dyn SessionDriver,
        candidates: &[SelectorCandidate],
        timeout_budget_ms: u64,
    ) -> Result<ResolvedElement, ResolveError> {
        if candidates.is_empty() {
            return Err(ResolveError::InvalidInput(
                "candidate list is empty".to_string(),
            ));
        }
        if timeout_budget_ms == 0 {
            return Err(ResolveError::InvalidInput(
                "timeout budget must be greater than 0".to_string(),
            ));
        }

        let started = Instant::now();
        let budget = Duration::from_millis(timeout_budget_ms);
        let mut attempts = Vec::with_capacity(candidates.len());

        for (index, candidate) in candidates.iter().enumerate() {
            let remaining = budget.saturating_sub(started.elapsed());
            let window = remaining / (candidates.len() - index) as u32;
            debug!(
                candidate = %candidate.describe(),
                window_ms = window.as_millis() as u64,
                "Opening candidate window"
            );

            match self.poll_candidate(driver, candidate, window).await {
                PollOutcome::Satisfied { snapshot, polls } => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    info!(
                        candidate = %candidate.describe(),
                        index,
                        polls,
                        elapsed_ms,
                        "Candidate satisfied its condition"
                    );
                    return Ok(ResolvedElement {
                        snapshot,
                        candidate_index: index,
                        candidate: candidate.clone(),
                        elapsed_ms,
                    });
                }
                PollOutcome::Elapsed {
                    elapsed_ms,
                    polls,
                    last_error,
                } => {
                    debug!(
                        candidate = %candidate.describe(),
                        polls,
                        "Candidate window elapsed"
                    );
                    attempts.push(CandidateAttempt {
                        candidate: candidate.describe(),
                        elapsed_ms,
                        polls,
                        last_error,
                    });
                }
            }
        }

        warn!(
            budget_ms = timeout_budget_ms,
            candidates = candidates.len(),
            "All candidate windows exhausted"
        );
        Err(ResolveError::Exhausted {
            budget_ms: timeout_budget_ms,
            attempts,
        })
    }
}

enum PollOutcome {
    Satisfied {
        snapshot: ElementSnapshot,
        polls: u32,
    },
    Elapsed {
        elapsed_ms: u64,
        polls: u32,
        last_error: Option<String>,
    },
}

impl DefaultSelectorResolver {
    /// Poll one candidate until its condition holds or its window elapses.
    /// Every candidate gets at least one query, even for a zero-width window.
    async fn poll_candidate(
        &self,
        driver: &dyn SessionDriver,
        candidate: &SelectorCandidate,
        window: Duration,
    ) -> PollOutcome {
        let opened = Instant::now();
        let deadline = opened + window;
        let mut polls = 0u32;
        let mut last_error = None;

        loop {
            polls += 1;
            match driver.query(candidate).await {
                Ok(Some(snapshot)) if snapshot.satisfies(candidate.condition) => {
                    return PollOutcome::Satisfied { snapshot, polls };
                }
                Ok(Some(_)) => {
                    // Found but condition not yet met; keep polling
                }
                Ok(None) => {}
                Err(err) if err.is_transient() => {
                    // Stale references and I/O hiccups count as "not yet",
                    // retried within this candidate's own window
                    debug!(
                        candidate = %candidate.describe(),
                        error = %err,
                        "Transient query error"
                    );
                    last_error = Some(err.to_string());
                }
                Err(err) => {
                    // Non-transient errors close this window early; the next
                    // candidate may still match
                    warn!(
                        candidate = %candidate.describe(),
                        error = %err,
                        "Query failed"
                    );
                    last_error = Some(err.to_string());
                    break;
                }
            }

            if Instant::now() + self.poll_interval >= deadline {
                break;
            }
            sleep(self.poll_interval).await;
        }

        PollOutcome::Elapsed {
            elapsed_ms: opened.elapsed().as_millis() as u64,
            polls,
            last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagevet_core_types::TargetCondition;
    use session_driver::fake::{FakeSessionDriver, QueryScript};

    fn quick_resolver() -> DefaultSelectorResolver {
        DefaultSelectorResolver::new().with_poll_interval(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let driver = FakeSessionDriver::new();
        driver.script_query("#a", QueryScript::Missing);
        driver.script_query("#b", QueryScript::Found(ElementSnapshot::new("el-b")));
        driver.script_query("#c", QueryScript::Found(ElementSnapshot::new("el-c")));

        let candidates = vec![
            SelectorCandidate::css("#a", TargetCondition::Present),
            SelectorCandidate::css("#b", TargetCondition::Present),
            SelectorCandidate::css("#c", TargetCondition::Present),
        ];

        let resolved = quick_resolver()
            .resolve(&driver, &candidates, 300)
            .await
            .unwrap();

        assert_eq!(resolved.candidate_index, 1);
        assert_eq!(resolved.snapshot.handle.0, "el-b");
        // First success wins; the third candidate is never attempted
        assert!(!driver.was_queried("#c"));
    }

    #[tokio::test]
    async fn test_later_candidates_are_not_starved() {
        let driver = FakeSessionDriver::new();
        driver.script_query("#first", QueryScript::Missing);
        // Needs more than one poll, so a zero-width window would miss it
        driver.script_query(
            "#second",
            QueryScript::FoundAfter {
                misses: 2,
                snapshot: ElementSnapshot::new("el-2"),
            },
        );
        driver.script_query("#third", QueryScript::Missing);

        let candidates = vec![
            SelectorCandidate::css("#first", TargetCondition::Present),
            SelectorCandidate::css("#second", TargetCondition::Present),
            SelectorCandidate::css("#third", TargetCondition::Present),
        ];

        let resolved = quick_resolver()
            .resolve(&driver, &candidates, 300)
            .await
            .unwrap();

        assert_eq!(resolved.candidate_index, 1);
        assert!(driver.query_count("#second") >= 3);
    }

    #[tokio::test]
    async fn test_transient_errors_count_as_pending() {
        let driver = FakeSessionDriver::new();
        driver.script_query(
            "#flaky",
            QueryScript::TransientThenFound {
                failures: 2,
                snapshot: ElementSnapshot::new("el-f"),
            },
        );

        let candidates = vec![SelectorCandidate::css("#flaky", TargetCondition::Present)];
        let resolved = quick_resolver()
            .resolve(&driver, &candidates, 500)
            .await
            .unwrap();

        assert_eq!(resolved.candidate_index, 0);
        assert!(driver.query_count("#flaky") >= 3);
    }

    #[tokio::test]
    async fn test_condition_gate_holds_back_unready_elements() {
        let driver = FakeSessionDriver::new();
        driver.script_query(
            "#hidden",
            QueryScript::Found(ElementSnapshot::new("el-h").with_state(false, true)),
        );

        let candidates = vec![SelectorCandidate::css("#hidden", TargetCondition::Visible)];
        let err = quick_resolver()
            .resolve(&driver, &candidates, 100)
            .await
            .unwrap_err();

        match err {
            ResolveError::Exhausted { attempts, .. } => {
                assert_eq!(attempts.len(), 1);
                assert!(attempts[0].polls >= 1);
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exhaustion_carries_per_candidate_diagnostics() {
        let driver = FakeSessionDriver::new();
        driver.script_query("#x", QueryScript::Missing);
        driver.script_query("#y", QueryScript::Missing);

        let candidates = vec![
            SelectorCandidate::xpath("//div[@id='x']", TargetCondition::Present),
            SelectorCandidate::css("#y", TargetCondition::Present),
        ];
        // Keep both expressions distinct from the scripted keys on purpose:
        // unscripted expressions miss as well
        let err = quick_resolver()
            .resolve(&driver, &candidates, 120)
            .await
            .unwrap_err();

        match err {
            ResolveError::Exhausted { budget_ms, attempts } => {
                assert_eq!(budget_ms, 120);
                assert_eq!(attempts.len(), 2);
                assert!(attempts[0].candidate.starts_with("xpath:"));
                assert!(attempts[1].candidate.starts_with("css:"));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_rejected() {
        let driver = FakeSessionDriver::new();
        let err = quick_resolver().resolve(&driver, &[], 100).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_zero_budget_rejected() {
        let driver = FakeSessionDriver::new();
        let candidates = vec![SelectorCandidate::css("#a", TargetCondition::Present)];
        let err = quick_resolver()
            .resolve(&driver, &candidates, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidInput(_)));
    }
}
