//! Selector resolution with an ordered fallback chain
//!
//! The selector surface of the applications this engine drives is unstable:
//! no single expression survives every deploy. Callers therefore author an
//! ordered list of candidates per element; this crate shares one timeout
//! budget across them, polls each candidate's readiness condition, and
//! short-circuits on the first hit. Exhaustion carries per-candidate timing
//! diagnostics instead of a bare "not found".

pub mod errors;
pub mod resolver;
pub mod types;

pub use errors::*;
pub use resolver::*;
pub use types::*;
