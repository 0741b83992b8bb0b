//! Outbound status reporting.

use std::error::Error as StdError;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::info;

use super::state::{ServiceState, StatusReport};

const STATUS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::status");

/// Sink for status records destined for the OS service manager.
///
/// Implementations must not block: the service manager expects prompt
/// answers and the control loop waits on nothing but its next event.
pub trait StatusReporter: Send {
    /// Pushes one status record.
    fn report(&mut self, status: StatusReport) -> Result<(), ReportError>;

    /// Pushes the terminal Stopped record carrying the process exit code.
    fn report_stopped(&mut self, exit_code: u32) -> Result<(), ReportError> {
        let _ = exit_code;
        self.report(StatusReport::for_state(ServiceState::Stopped))
    }
}

/// Errors raised while pushing a status record.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The platform service manager refused the record.
    #[error("service manager rejected the {state} status: {source}")]
    Backend {
        /// State that failed to publish.
        state: ServiceState,
        /// Underlying platform error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Last status published to the service manager.
///
/// OS bindings read it to answer interrogation with the value the manager
/// already holds; only the reporter writes it.
#[derive(Debug, Clone)]
pub struct LastReport {
    inner: Arc<Mutex<StatusReport>>,
}

impl LastReport {
    /// Starts out as StartPending.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StatusReport::for_state(
                ServiceState::StartPending,
            ))),
        }
    }

    /// Most recently published status.
    #[must_use]
    pub fn get(&self) -> StatusReport {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set(&self, status: StatusReport) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }
}

impl Default for LastReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Reporter used when no service manager is attached: records go to the log.
#[derive(Debug, Clone, Default)]
pub struct LoggingStatusReporter {
    last: LastReport,
}

impl LoggingStatusReporter {
    /// Builds a reporter publishing into `last`.
    #[must_use]
    pub const fn new(last: LastReport) -> Self {
        Self { last }
    }
}

impl StatusReporter for LoggingStatusReporter {
    fn report(&mut self, status: StatusReport) -> Result<(), ReportError> {
        self.last.set(status);
        info!(
            target: STATUS_TARGET,
            state = %status.state,
            accepts = ?status.accepts,
            "service status reported"
        );
        Ok(())
    }

    fn report_stopped(&mut self, exit_code: u32) -> Result<(), ReportError> {
        let status = StatusReport::for_state(ServiceState::Stopped);
        self.last.set(status);
        info!(
            target: STATUS_TARGET,
            state = %status.state,
            exit_code,
            "service status reported"
        );
        Ok(())
    }
}
