//! pagevet - resilient action/verification engine for scripted web flows
//!
//! The engine automates verification of a web application's behavior by
//! driving a browser session through authored flows and reporting
//! structured pass/fail outcomes. Its pieces:
//!
//! - [`selector_resolver`]: resolves a UI element despite an unstable
//!   selector surface by trying an ordered candidate list under a shared
//!   timeout budget.
//! - [`action_runner`]: executes click / set-text / choose-option against
//!   the resolved element with retry discipline and overlay mitigation.
//! - [`state_verifier`]: combines weighted weak signals (URL fragments,
//!   marker presence or disappearance) into a single verdict, with
//!   negative indicators vetoing.
//! - [`flow_runner`]: walks the step list in order, continues past
//!   non-fatal failures, aborts on fatal ones, and always finalizes an
//!   append-only run report.
//!
//! Business flows, credentials and browser provisioning live with the
//! caller: author `StepSpec`s, implement or reuse a
//! [`session_driver::SessionDriver`], and hand both to a
//! [`flow_runner::FlowRunner`].

pub use action_runner;
pub use flow_runner;
pub use pagevet_core_types as core_types;
pub use selector_resolver;
pub use session_driver;
pub use state_verifier;

/// Commonly used surface in one import
pub mod prelude {
    pub use action_runner::{ActionRunner, DefaultActionRunner, MitigationPolicy};
    pub use flow_runner::{
        FinalizedReport, FlowError, FlowRunner, FlowState, NullSink, ReportSink, RunReport,
        TracingSink,
    };
    pub use pagevet_core_types::{
        ActionPayload, Heuristic, HeuristicProbe, RunId, SelectorCandidate, SelectorStrategy,
        StepKind, StepResult, StepSpec, StepStatus, TargetCondition,
    };
    pub use selector_resolver::{DefaultSelectorResolver, ResolveError, SelectorResolver};
    pub use session_driver::{DriverError, ElementHandle, ElementSnapshot, SessionDriver};
    pub use state_verifier::{DefaultStateVerifier, StateVerifier, Verdict};
}
