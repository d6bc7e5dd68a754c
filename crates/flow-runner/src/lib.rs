//! Flow orchestration and run reporting
//!
//! The runner walks an authored step list in order, dispatching action
//! steps to the action runner and checkpoint steps to the state verifier,
//! and accumulates every outcome into an append-only run report. Non-fatal
//! failures do not stop the flow, so one run can surface several
//! independent issues; a fatal failure aborts the remainder, but the report
//! is always finalized and delivered to the configured sink first.

pub mod errors;
pub mod report;
pub mod runner;

pub use errors::FlowError;
pub use report::{FinalizedReport, NullSink, ReportSink, RunReport, TracingSink};
pub use runner::{FlowRunner, FlowState};
