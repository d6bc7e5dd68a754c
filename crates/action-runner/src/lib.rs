//! Action execution with timeout, retry and overlay mitigation
//!
//! An action step resolves its element through the fallback chain, applies
//! its payload, and degrades gracefully: intercepted interactions trigger a
//! bounded number of overlay-dismissal passes, exhausted retries become a
//! structured failed result rather than an escaped error.

pub mod errors;
pub mod mitigation;
pub mod runner;

pub use errors::*;
pub use mitigation::*;
pub use runner::*;
