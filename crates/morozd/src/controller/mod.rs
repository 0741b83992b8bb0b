//! Service lifecycle controller.
//!
//! The controller is split into a pure transition function
//! ([`machine::step`]) and a thin async runner ([`ServiceController`]) that
//! reads control requests, drives the optional periodic task and pushes
//! status records through a [`StatusReporter`]. OS bindings only translate
//! platform callbacks into [`ControlRequest`] values.

pub mod machine;
mod reporter;
mod runner;
mod state;
mod ticker;

pub use machine::{ControlEvent, Effect, Transition, step};
pub use reporter::{LastReport, LoggingStatusReporter, ReportError, StatusReporter};
pub use runner::ServiceController;
pub use state::{
    AcceptedCommands, ControlRequest, ControllerExit, ExitReason, NO_RESTART_EXIT_CODE,
    ServiceState, StatusReport,
};
