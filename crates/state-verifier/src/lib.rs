//! Multi-signal state verification
//!
//! No single signal reliably tells whether a flow reached its expected
//! state: URLs change late, markers render early, titles lag. Checkpoints
//! therefore OR several weighted positive signals and let negative
//! indicators (an error banner, a login form that should be gone) veto the
//! whole verdict. Every probe outcome is quoted in the verdict's evidence
//! so a report reader can tell which signal carried the decision.

pub mod types;
pub mod verifier;

pub use types::*;
pub use verifier::*;
