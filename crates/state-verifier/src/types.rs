//! Verification verdict types

use serde::{Deserialize, Serialize};

/// Boolean-with-evidence verdict for "did the flow reach the expected state"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the expected state was reached
    pub loaded: bool,

    /// Sum of the weights of positive heuristics that held
    pub score: u32,

    /// Per-heuristic outcome lines, in evaluation order
    pub evidence: Vec<String>,
}

impl Verdict {
    /// Evidence joined into a single line for step results
    pub fn evidence_line(&self) -> String {
        self.evidence.join("; ")
    }
}
