//! Flow execution error types

use thiserror::Error;

use crate::report::FinalizedReport;

/// Flow execution errors
#[derive(Debug, Error)]
pub enum FlowError {
    /// Step list failed structural validation; nothing was executed
    #[error("flow validation failed: {0}")]
    Validation(String),

    /// A fatal step failed. The report was finalized and delivered to the
    /// sink before this error was raised, and travels with it so the caller
    /// receives both the terminal cause and the complete report.
    #[error("fatal step '{step}' aborted the flow: {reason}")]
    FatalStep {
        step: String,
        reason: String,
        report: Box<FinalizedReport>,
    },

    /// Step dispatch hit a programming error that validation should have
    /// ruled out. The report collected so far was still finalized and
    /// delivered to the sink.
    #[error("internal dispatch error at step '{step}': {reason}")]
    Internal { step: String, reason: String },
}
