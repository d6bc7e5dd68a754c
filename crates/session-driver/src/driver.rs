//! The SessionDriver trait and element types

use async_trait::async_trait;
use pagevet_core_types::{ActionPayload, SelectorCandidate, TargetCondition};
use serde::{Deserialize, Serialize};

use crate::errors::DriverError;

/// Opaque reference to a located element within the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle(pub String);

/// Snapshot of a located element's interaction-relevant state
///
/// Visibility and enablement are captured at query time so condition checks
/// need no extra round-trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Handle for subsequent `act` calls
    pub handle: ElementHandle,

    /// Element tag name, if the driver reports one
    pub tag_name: Option<String>,

    /// Whether the element is rendered visible
    pub visible: bool,

    /// Whether the element is enabled for interaction
    pub enabled: bool,
}

impl ElementSnapshot {
    /// Snapshot of a visible, enabled element
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: ElementHandle(handle.into()),
            tag_name: None,
            visible: true,
            enabled: true,
        }
    }

    pub fn with_tag(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = Some(tag_name.into());
        self
    }

    pub fn with_state(mut self, visible: bool, enabled: bool) -> Self {
        self.visible = visible;
        self.enabled = enabled;
        self
    }

    /// Whether the snapshot satisfies a candidate's readiness condition
    pub fn satisfies(&self, condition: TargetCondition) -> bool {
        match condition {
            TargetCondition::Present => true,
            TargetCondition::Visible => self.visible,
            TargetCondition::Clickable => self.visible && self.enabled,
        }
    }
}

/// Capability set the engine consumes
///
/// One flow run owns exactly one driver for its whole duration; drivers are
/// never shared between runs. `query`, `current_url` and `page_title` are
/// read-only probes; only `navigate` and `act` mutate session state.
#[async_trait]
pub trait SessionDriver: Send + Sync {
    /// Navigate the session to a URL
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Query for an element matching the candidate's expression.
    ///
    /// Returns `Ok(None)` when nothing matches; condition satisfaction is
    /// judged by the caller from the snapshot.
    async fn query(
        &self,
        candidate: &SelectorCandidate,
    ) -> Result<Option<ElementSnapshot>, DriverError>;

    /// Apply an action payload to a previously located element
    async fn act(&self, handle: &ElementHandle, payload: &ActionPayload)
        -> Result<(), DriverError>;

    /// Current URL of the session
    async fn current_url(&self) -> Result<String, DriverError>;

    /// Current page title of the session
    async fn page_title(&self) -> Result<String, DriverError>;

    /// Capture evidence of the current page state (e.g. a screenshot),
    /// returning a reference the caller can record
    async fn capture_evidence(&self) -> Result<Option<String>, DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_condition_matrix() {
        let visible = ElementSnapshot::new("el-1");
        assert!(visible.satisfies(TargetCondition::Present));
        assert!(visible.satisfies(TargetCondition::Visible));
        assert!(visible.satisfies(TargetCondition::Clickable));

        let hidden = ElementSnapshot::new("el-2").with_state(false, true);
        assert!(hidden.satisfies(TargetCondition::Present));
        assert!(!hidden.satisfies(TargetCondition::Visible));
        assert!(!hidden.satisfies(TargetCondition::Clickable));

        let disabled = ElementSnapshot::new("el-3").with_state(true, false);
        assert!(disabled.satisfies(TargetCondition::Visible));
        assert!(!disabled.satisfies(TargetCondition::Clickable));
    }
}
