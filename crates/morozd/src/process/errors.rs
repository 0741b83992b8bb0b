//! Defines the unified error surface for service launch.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use moroz_config::LogFileError;

use crate::host::HostError;
use crate::http::ListenerError;
use crate::telemetry::TelemetryError;

/// Errors surfaced while launching or hosting the service.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Config {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// The working directory could not be determined.
    #[error("failed to resolve working directory: {source}")]
    WorkingDirectory {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The log file path could not be prepared.
    #[error("failed to prepare log file: {source}")]
    LogFile {
        /// Underlying path error.
        #[source]
        source: LogFileError,
    },
    /// The log file could not be opened for appending.
    #[error("failed to open log file '{}': {source}", path.display())]
    LogOpen {
        /// Log file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Telemetry could not be installed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The async runtime could not be built.
    #[error("failed to build async runtime: {source}")]
    Runtime {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The HTTP listener could not be bound.
    #[error("HTTP listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// The OS bindings failed.
    #[error("service host failed: {source}")]
    Host {
        /// Underlying host error.
        #[source]
        source: HostError,
    },
}

impl From<Arc<OrthoError>> for LaunchError {
    fn from(source: Arc<OrthoError>) -> Self {
        Self::Config { source }
    }
}

impl From<LogFileError> for LaunchError {
    fn from(source: LogFileError) -> Self {
        Self::LogFile { source }
    }
}

impl From<TelemetryError> for LaunchError {
    fn from(source: TelemetryError) -> Self {
        Self::Telemetry { source }
    }
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}

impl From<HostError> for LaunchError {
    fn from(source: HostError) -> Self {
        Self::Host { source }
    }
}
