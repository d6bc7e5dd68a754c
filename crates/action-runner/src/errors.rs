//! Error types for action execution

use selector_resolver::ResolveError;
use thiserror::Error;

/// Action execution error enumeration
#[derive(Debug, Error)]
pub enum ActionError {
    /// No candidate resolved within the step budget
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// Interaction still intercepted after all mitigation passes
    #[error("interaction blocked after {passes} mitigation passes: {reason}")]
    Blocked { passes: u32, reason: String },

    /// Driver failure outside the intercepted class
    #[error("driver failure: {0}")]
    Driver(String),

    /// Step handed to the runner is not an Action step
    #[error("step '{0}' is not an action step")]
    WrongKind(String),

    /// Action step authored without a payload
    #[error("action step '{0}' has no payload")]
    MissingPayload(String),
}

impl ActionError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            ActionError::Resolution(err) => err.is_retryable(),
            ActionError::Blocked { .. } | ActionError::Driver(_) => true,
            ActionError::WrongKind(_) | ActionError::MissingPayload(_) => false,
        }
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            ActionError::WrongKind(_) | ActionError::MissingPayload(_) => 3,
            ActionError::Driver(_) => 2,
            ActionError::Resolution(_) | ActionError::Blocked { .. } => 1,
        }
    }
}
