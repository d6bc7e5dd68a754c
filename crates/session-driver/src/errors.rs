//! Driver error taxonomy

use thiserror::Error;

/// Errors surfaced by a session driver
#[derive(Debug, Error, Clone)]
pub enum DriverError {
    /// Element reference went stale (re-render, navigation)
    #[error("stale element reference: {0}")]
    StaleElement(String),

    /// Interaction was intercepted by another element (overlay, backdrop)
    #[error("interaction intercepted by {by}")]
    InteractionIntercepted { by: String },

    /// Target element or page object does not exist
    #[error("target not found: {0}")]
    TargetNotFound(String),

    /// Navigation did not settle in time
    #[error("navigation timeout: {0}")]
    NavTimeout(String),

    /// Transport-level failure talking to the session
    #[error("driver I/O error: {0}")]
    Io(String),

    /// Internal driver error (should not happen in normal operation)
    #[error("internal driver error: {0}")]
    Internal(String),
}

impl DriverError {
    /// Transient errors count as "not yet" during polling, not as failure
    pub fn is_transient(&self) -> bool {
        matches!(self, DriverError::StaleElement(_) | DriverError::Io(_))
    }

    /// Whether this error is the "interaction blocked" class that overlay
    /// mitigation can address
    pub fn is_interaction_blocked(&self) -> bool {
        matches!(self, DriverError::InteractionIntercepted { .. })
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            DriverError::Internal(_) => 3,
            DriverError::NavTimeout(_) | DriverError::Io(_) => 2,
            DriverError::StaleElement(_) | DriverError::TargetNotFound(_) => 1,
            DriverError::InteractionIntercepted { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(DriverError::StaleElement("ref".to_string()).is_transient());
        assert!(DriverError::Io("socket".to_string()).is_transient());
        assert!(!DriverError::TargetNotFound("x".to_string()).is_transient());
        assert!(!DriverError::InteractionIntercepted {
            by: "overlay".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_blocked_classification() {
        assert!(DriverError::InteractionIntercepted {
            by: ".modal".to_string()
        }
        .is_interaction_blocked());
        assert!(!DriverError::StaleElement("ref".to_string()).is_interaction_blocked());
    }
}
