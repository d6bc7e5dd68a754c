//! Error types for selector resolution

use thiserror::Error;

use crate::types::CandidateAttempt;

/// Resolution error enumeration
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Every candidate's share of the budget elapsed without satisfaction
    #[error(
        "no candidate satisfied its condition within {budget_ms}ms ({} exhausted)",
        .attempts.len()
    )]
    Exhausted {
        budget_ms: u64,
        /// Per-candidate timing and error diagnostics, in authored order
        attempts: Vec<CandidateAttempt>,
    },

    /// Empty candidate list or zero budget
    #[error("invalid resolution input: {0}")]
    InvalidInput(String),
}

impl ResolveError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolveError::Exhausted { .. })
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            ResolveError::InvalidInput(_) => 2,
            ResolveError::Exhausted { .. } => 1,
        }
    }
}
