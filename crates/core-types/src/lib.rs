//! Shared data model for the pagevet engine
//!
//! Flow authors describe their scenario with these types: ordered selector
//! candidates per element, action payloads, step specs and heuristics. The
//! engine crates produce the result side: step results and statuses. All
//! types here are plain data with serde derives so flows can be authored,
//! stored and replayed as JSON.

pub mod action;
pub mod heuristic;
pub mod ids;
pub mod selector;
pub mod step;

pub use action::*;
pub use heuristic::*;
pub use ids::*;
pub use selector::*;
pub use step::*;
