//! Service host for the Moroz HTTP server.
//!
//! The host runs a small HTTP server under the control of the operating
//! system's service manager. Its core is the lifecycle controller in
//! [`controller`]: a pure transition function wrapped by an async loop that
//! receives control requests, reports status back to the manager, drives an
//! optional heartbeat and coordinates the listener's lifetime.
//!
//! Launch follows a fixed sequence. Configuration is loaded through
//! [`moroz_config`], the log file is opened and telemetry installed, the
//! listener is bound, and the process is then handed to one of three hosts:
//!
//! - **Debug**: console signals drive the controller and logs are mirrored
//!   to stderr.
//! - **Managed**: the Windows Service Control Manager (or systemd) drives it.
//! - **Standalone**: no service manager owns the process, so the listener
//!   serves until interrupted.
//!
//! Installation is a separate concern handled by [`installer`].

pub mod bootstrap;
pub mod controller;
mod host;
pub mod http;
pub mod installer;
mod observer;
mod process;
mod telemetry;

pub use bootstrap::{ConfigLoader, StaticConfigLoader, SystemConfigLoader};
pub use host::HostError;
pub use observer::{LifecycleObserver, StructuredLifecycleObserver};
pub use process::{FATAL_EXIT_CODE, LaunchError, LaunchMode, RunOutcome, run_service};
pub use telemetry::{LogSink, TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
