//! State verifier implementation

use async_trait::async_trait;
use pagevet_core_types::{Heuristic, HeuristicProbe};
use session_driver::{DriverError, SessionDriver};
use tracing::{debug, info};

use crate::types::Verdict;

/// State verifier trait
#[async_trait]
pub trait StateVerifier: Send + Sync {
    /// Evaluate the heuristics against current session state and produce a
    /// single verdict. Never fails: a probe error counts as `false` and is
    /// noted in the evidence.
    async fn verify(
        &self,
        driver: &dyn SessionDriver,
        heuristics: &[Heuristic],
        negative_indicators: &[Heuristic],
    ) -> Verdict;
}

/// Default state verifier implementation
///
/// Positive heuristics are independent and evaluated in order; their weights
/// are summed when they hold. Any true negative indicator vetoes the verdict
/// regardless of the positive score. An empty heuristic list is never
/// vacuously true.
pub struct DefaultStateVerifier;

impl DefaultStateVerifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DefaultStateVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateVerifier for DefaultStateVerifier {
    async fn verify(
        &self,
        driver: &dyn SessionDriver,
        heuristics: &[Heuristic],
        negative_indicators: &[Heuristic],
    ) -> Verdict {
        let mut evidence = Vec::with_capacity(heuristics.len() + negative_indicators.len());
        let mut score = 0u32;

        for heuristic in heuristics {
            match evaluate_probe(driver, &heuristic.probe).await {
                Ok(true) => {
                    score = score.saturating_add(heuristic.weight);
                    evidence.push(format!(
                        "[+{}] {} => true",
                        heuristic.weight, heuristic.description
                    ));
                }
                Ok(false) => {
                    evidence.push(format!(
                        "[+{}] {} => false",
                        heuristic.weight, heuristic.description
                    ));
                }
                Err(err) => {
                    debug!(
                        heuristic = %heuristic.description,
                        error = %err,
                        "Probe failed, counted as false"
                    );
                    evidence.push(format!(
                        "[+{}] {} => error: {} (counted false)",
                        heuristic.weight, heuristic.description, err
                    ));
                }
            }
        }

        let mut vetoed = false;
        for indicator in negative_indicators {
            match evaluate_probe(driver, &indicator.probe).await {
                Ok(true) => {
                    vetoed = true;
                    evidence.push(format!("[veto] {} => true", indicator.description));
                }
                Ok(false) => {
                    evidence.push(format!("[veto] {} => false", indicator.description));
                }
                Err(err) => {
                    debug!(
                        indicator = %indicator.description,
                        error = %err,
                        "Negative probe failed, counted as false"
                    );
                    evidence.push(format!(
                        "[veto] {} => error: {} (counted false)",
                        indicator.description, err
                    ));
                }
            }
        }

        let loaded = !vetoed && score > 0;
        info!(loaded, score, vetoed, "State verification verdict");
        Verdict {
            loaded,
            score,
            evidence,
        }
    }
}

/// Evaluate one probe read-only against the session
async fn evaluate_probe(
    driver: &dyn SessionDriver,
    probe: &HeuristicProbe,
) -> Result<bool, DriverError> {
    match probe {
        HeuristicProbe::UrlContains(fragment) => {
            Ok(driver.current_url().await?.contains(fragment))
        }
        HeuristicProbe::UrlEquals(url) => Ok(driver.current_url().await? == *url),
        HeuristicProbe::TitleContains(fragment) => {
            Ok(driver.page_title().await?.contains(fragment))
        }
        HeuristicProbe::ElementPresent(candidate) => Ok(matches!(
            driver.query(candidate).await?,
            Some(snapshot) if snapshot.satisfies(candidate.condition)
        )),
        HeuristicProbe::ElementAbsent(candidate) => Ok(!matches!(
            driver.query(candidate).await?,
            Some(snapshot) if snapshot.satisfies(candidate.condition)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagevet_core_types::{SelectorCandidate, TargetCondition};
    use session_driver::fake::{FakeSessionDriver, QueryScript};
    use session_driver::ElementSnapshot;

    #[tokio::test]
    async fn test_weighted_or_any_positive_signal_loads() {
        let driver = FakeSessionDriver::new()
            .with_url("https://app.example/orders")
            .with_title("Pending orders");

        let heuristics = vec![
            Heuristic::url_contains("/billing", 5),
            Heuristic::title_contains("orders", 2),
        ];

        let verdict = DefaultStateVerifier::new()
            .verify(&driver, &heuristics, &[])
            .await;

        assert!(verdict.loaded);
        assert_eq!(verdict.score, 2);
        assert_eq!(verdict.evidence.len(), 2);
        assert!(verdict.evidence[0].contains("=> false"));
        assert!(verdict.evidence[1].contains("=> true"));
    }

    #[tokio::test]
    async fn test_negative_indicator_vetoes_positive_score() {
        let driver = FakeSessionDriver::new().with_url("https://app.example/orders");
        driver.script_query(
            ".error-banner",
            QueryScript::Found(ElementSnapshot::new("el-err")),
        );

        let heuristics = vec![
            Heuristic::url_contains("/orders", 7),
            Heuristic::url_contains("app.example", 3),
        ];
        let negatives = vec![Heuristic::element_present(
            SelectorCandidate::css(".error-banner", TargetCondition::Present),
            1,
        )];

        let verdict = DefaultStateVerifier::new()
            .verify(&driver, &heuristics, &negatives)
            .await;

        assert!(!verdict.loaded);
        // Positive score is still reported for diagnostics
        assert_eq!(verdict.score, 10);
        assert!(verdict.evidence.iter().any(|line| line.contains("[veto]")));
    }

    #[tokio::test]
    async fn test_empty_heuristics_never_vacuously_true() {
        let driver = FakeSessionDriver::new();
        let verdict = DefaultStateVerifier::new().verify(&driver, &[], &[]).await;

        assert!(!verdict.loaded);
        assert_eq!(verdict.score, 0);
        assert!(verdict.evidence.is_empty());
    }

    #[tokio::test]
    async fn test_marker_disappearance_signal() {
        let driver = FakeSessionDriver::new();
        // The login form marker is gone after a successful sign-in

        let heuristics = vec![Heuristic::element_absent(
            SelectorCandidate::css("#login-form", TargetCondition::Present),
            1,
        )];

        let verdict = DefaultStateVerifier::new()
            .verify(&driver, &heuristics, &[])
            .await;

        assert!(verdict.loaded);
        assert_eq!(verdict.score, 1);
    }

    #[tokio::test]
    async fn test_probe_error_counts_as_false() {
        let driver = FakeSessionDriver::new();
        driver.script_query(
            "#marker",
            QueryScript::TransientThenFound {
                failures: 5,
                snapshot: ElementSnapshot::new("el-m"),
            },
        );

        let heuristics = vec![Heuristic::element_present(
            SelectorCandidate::css("#marker", TargetCondition::Present),
            4,
        )];

        let verdict = DefaultStateVerifier::new()
            .verify(&driver, &heuristics, &[])
            .await;

        assert!(!verdict.loaded);
        assert_eq!(verdict.score, 0);
        assert!(verdict.evidence[0].contains("counted false"));
    }

    #[tokio::test]
    async fn test_duplicate_heuristics_double_count() {
        let driver = FakeSessionDriver::new().with_url("https://app.example/done");

        let heuristics = vec![
            Heuristic::url_contains("/done", 3),
            Heuristic::url_contains("/done", 3),
        ];

        let verdict = DefaultStateVerifier::new()
            .verify(&driver, &heuristics, &[])
            .await;

        // Duplicates double-count; the decision is threshold-based, not exact
        assert!(verdict.loaded);
        assert_eq!(verdict.score, 6);
    }
}
