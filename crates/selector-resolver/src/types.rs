//! Resolution outcome types

use pagevet_core_types::SelectorCandidate;
use serde::{Deserialize, Serialize};
use session_driver::ElementSnapshot;

/// Successful resolution outcome
#[derive(Debug, Clone)]
pub struct ResolvedElement {
    /// Element state at resolution time
    pub snapshot: ElementSnapshot,

    /// Index of the winning candidate in the authored list
    pub candidate_index: usize,

    /// The winning candidate
    pub candidate: SelectorCandidate,

    /// Time from the start of resolution to the hit
    pub elapsed_ms: u64,
}

/// Diagnostics for one candidate whose window elapsed without a hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateAttempt {
    /// Candidate description (strategy, expression, condition)
    pub candidate: String,

    /// Time spent inside this candidate's window
    pub elapsed_ms: u64,

    /// Queries issued during the window
    pub polls: u32,

    /// Last driver error observed, if any
    pub last_error: Option<String>,
}
