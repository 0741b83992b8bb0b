//! Process-level plumbing: log file, run mode selection and the launch
//! sequence.

mod errors;
mod files;
pub(crate) mod launch;

pub use errors::LaunchError;
pub use launch::{LaunchMode, RunOutcome, run_service};

/// Exit code for setup failures and listener failures after bind.
pub const FATAL_EXIT_CODE: u8 = 2;

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
pub(crate) const DEBUG_ENV_VAR: &str = "DEBUG";
