//! Shared configuration for the Moroz service host and its installer.
//!
//! Values are layered by [`ortho_config`]: built-in defaults, then an optional
//! configuration file, then `MOROZ_*` environment variables, then command-line
//! flags. The resolved [`Config`] is handed to the service controller and the
//! installer explicitly; nothing reads the process environment after loading.

use std::time::Duration;

use camino::Utf8Path;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod log_file;
mod logging;

pub use defaults::{
    DEFAULT_DISPLAY_NAME, DEFAULT_LISTEN_ADDRESS, DEFAULT_LOG_FILE, DEFAULT_LOG_FILTER,
    DEFAULT_SERVICE_NAME, default_display_name, default_listen_address, default_log_file,
    default_log_filter, default_log_filter_string, default_log_format, default_service_name,
};
pub use log_file::{LogFileError, LogFilePath};
pub use logging::LogFormat;

/// Resolved configuration for the service host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "MOROZ")]
pub struct Config {
    /// Name registered with the OS service manager.
    #[ortho_config(default = default_service_name())]
    pub service_name: String,
    /// Human-readable name shown by service management tools.
    #[ortho_config(default = default_display_name())]
    pub display_name: String,
    /// Socket address the HTTP listener binds to.
    #[ortho_config(default = default_listen_address())]
    pub listen_address: String,
    /// Log file path, relative to the working directory unless absolute.
    #[ortho_config(default = default_log_file())]
    pub log_file: String,
    /// Whether the log file's directory is created when missing.
    #[ortho_config(default = true)]
    pub create_log_directory: bool,
    /// `tracing` filter expression applied to the log output.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Line format of the log output.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Interval of the periodic heartbeat task in seconds; unset disables it.
    pub heartbeat_secs: Option<u64>,
    /// Runs the controller against the console instead of the service manager.
    #[ortho_config(default = false)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            display_name: default_display_name(),
            listen_address: default_listen_address(),
            log_file: default_log_file(),
            create_log_directory: true,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            heartbeat_secs: None,
            debug: false,
        }
    }
}

impl Config {
    /// Name registered with the OS service manager.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Human-readable service name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Socket address the HTTP listener binds to.
    #[must_use]
    pub fn listen_address(&self) -> &str {
        &self.listen_address
    }

    /// Configured log file path.
    #[must_use]
    pub fn log_file(&self) -> &Utf8Path {
        Utf8Path::new(&self.log_file)
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Line format of the log output.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Period of the heartbeat task, if one is configured.
    ///
    /// A zero interval is treated as disabled.
    #[must_use]
    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Whether debug mode was requested through configuration.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }
}
