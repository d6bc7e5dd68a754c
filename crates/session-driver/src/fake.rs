//! Scripted in-memory driver for tests
//!
//! Each selector expression and element handle can be given a small script
//! describing how successive calls behave, which is enough to exercise
//! polling, fallback, mitigation and retry paths without a browser.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use pagevet_core_types::{ActionPayload, SelectorCandidate};

use crate::driver::{ElementHandle, ElementSnapshot, SessionDriver};
use crate::errors::DriverError;

/// Per-expression query behavior
#[derive(Debug, Clone)]
pub enum QueryScript {
    /// Expression never matches
    Missing,

    /// Expression matches on every query
    Found(ElementSnapshot),

    /// Expression misses N queries, then matches
    FoundAfter { misses: u32, snapshot: ElementSnapshot },

    /// Transient errors for N queries, then a match
    TransientThenFound { failures: u32, snapshot: ElementSnapshot },
}

/// Per-handle act behavior
#[derive(Debug, Clone)]
pub enum ActScript {
    /// Action succeeds
    Succeed,

    /// Intercepted N times, then succeeds
    InterceptTimes { times: u32, by: String },

    /// Every attempt is intercepted
    AlwaysIntercept { by: String },
}

#[derive(Default)]
struct FakeState {
    url: String,
    title: String,
    queries: HashMap<String, QueryScript>,
    acts: HashMap<String, ActScript>,
    query_log: Vec<String>,
    act_log: Vec<(String, String)>,
    shots: u32,
}

/// Scripted driver; unscripted expressions miss, unscripted handles accept
/// every action
pub struct FakeSessionDriver {
    state: Mutex<FakeState>,
}

impl FakeSessionDriver {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
        }
    }

    pub fn with_url(self, url: impl Into<String>) -> Self {
        self.state.lock().unwrap().url = url.into();
        self
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.state.lock().unwrap().title = title.into();
        self
    }

    /// Script how queries for an expression behave
    pub fn script_query(&self, expression: impl Into<String>, script: QueryScript) {
        self.state
            .lock()
            .unwrap()
            .queries
            .insert(expression.into(), script);
    }

    /// Script how acts against a handle behave
    pub fn script_act(&self, handle: impl Into<String>, script: ActScript) {
        self.state
            .lock()
            .unwrap()
            .acts
            .insert(handle.into(), script);
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.state.lock().unwrap().url = url.into();
    }

    /// How many times an expression was queried
    pub fn query_count(&self, expression: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .query_log
            .iter()
            .filter(|e| e.as_str() == expression)
            .count()
    }

    pub fn was_queried(&self, expression: &str) -> bool {
        self.query_count(expression) > 0
    }

    /// Total number of act calls, across all handles
    pub fn act_count(&self) -> usize {
        self.state.lock().unwrap().act_log.len()
    }

    /// How many times a specific handle was acted on
    pub fn act_count_for(&self, handle: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .act_log
            .iter()
            .filter(|(h, _)| h.as_str() == handle)
            .count()
    }
}

impl Default for FakeSessionDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionDriver for FakeSessionDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.state.lock().unwrap().url = url.to_string();
        Ok(())
    }

    async fn query(
        &self,
        candidate: &SelectorCandidate,
    ) -> Result<Option<ElementSnapshot>, DriverError> {
        let mut state = self.state.lock().unwrap();
        state.query_log.push(candidate.expression.clone());

        match state.queries.get_mut(&candidate.expression) {
            None | Some(QueryScript::Missing) => Ok(None),
            Some(QueryScript::Found(snapshot)) => Ok(Some(snapshot.clone())),
            Some(QueryScript::FoundAfter { misses, snapshot }) => {
                if *misses == 0 {
                    Ok(Some(snapshot.clone()))
                } else {
                    *misses -= 1;
                    Ok(None)
                }
            }
            Some(QueryScript::TransientThenFound { failures, snapshot }) => {
                if *failures == 0 {
                    Ok(Some(snapshot.clone()))
                } else {
                    *failures -= 1;
                    Err(DriverError::StaleElement(candidate.expression.clone()))
                }
            }
        }
    }

    async fn act(
        &self,
        handle: &ElementHandle,
        payload: &ActionPayload,
    ) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        state.act_log.push((handle.0.clone(), payload.describe()));

        match state.acts.get_mut(&handle.0) {
            None | Some(ActScript::Succeed) => Ok(()),
            Some(ActScript::InterceptTimes { times, by }) => {
                if *times == 0 {
                    Ok(())
                } else {
                    *times -= 1;
                    Err(DriverError::InteractionIntercepted { by: by.clone() })
                }
            }
            Some(ActScript::AlwaysIntercept { by }) => {
                Err(DriverError::InteractionIntercepted { by: by.clone() })
            }
        }
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn page_title(&self) -> Result<String, DriverError> {
        Ok(self.state.lock().unwrap().title.clone())
    }

    async fn capture_evidence(&self) -> Result<Option<String>, DriverError> {
        let mut state = self.state.lock().unwrap();
        state.shots += 1;
        Ok(Some(format!("evidence-{:03}.png", state.shots)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagevet_core_types::TargetCondition;

    fn candidate(expression: &str) -> SelectorCandidate {
        SelectorCandidate::css(expression, TargetCondition::Present)
    }

    #[tokio::test]
    async fn test_found_after_script_counts_down() {
        let driver = FakeSessionDriver::new();
        driver.script_query(
            "#late",
            QueryScript::FoundAfter {
                misses: 2,
                snapshot: ElementSnapshot::new("el-late"),
            },
        );

        assert!(driver.query(&candidate("#late")).await.unwrap().is_none());
        assert!(driver.query(&candidate("#late")).await.unwrap().is_none());
        assert!(driver.query(&candidate("#late")).await.unwrap().is_some());
        assert_eq!(driver.query_count("#late"), 3);
    }

    #[tokio::test]
    async fn test_intercept_script_then_succeeds() {
        let driver = FakeSessionDriver::new();
        driver.script_act(
            "el-1",
            ActScript::InterceptTimes {
                times: 1,
                by: ".modal-backdrop".to_string(),
            },
        );

        let handle = ElementHandle("el-1".to_string());
        let err = driver.act(&handle, &ActionPayload::Click).await.unwrap_err();
        assert!(err.is_interaction_blocked());
        assert!(driver.act(&handle, &ActionPayload::Click).await.is_ok());
        assert_eq!(driver.act_count_for("el-1"), 2);
    }

    #[tokio::test]
    async fn test_unscripted_expression_misses() {
        let driver = FakeSessionDriver::new().with_url("https://app.example/login");
        assert!(driver.query(&candidate("#nope")).await.unwrap().is_none());
        assert_eq!(driver.current_url().await.unwrap(), "https://app.example/login");
    }
}
