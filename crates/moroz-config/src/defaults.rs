//! Built-in defaults for every configuration field.

use crate::logging::LogFormat;

/// Name under which the service is registered with the OS service manager.
///
/// The installer and the running service must agree on this value, otherwise
/// the service manager cannot route control requests to the process.
pub const DEFAULT_SERVICE_NAME: &str = "moroz-winservice";

/// Human-readable name shown by service management tools.
pub const DEFAULT_DISPLAY_NAME: &str = "Moroz Windows Service";

/// HTTP listen address: port 3000 on every interface.
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:3000";

/// Log file location, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "log/debug.log";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned service name used where allocation is required (e.g. serde).
#[must_use]
pub fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_owned()
}

/// Owned display name used where allocation is required.
#[must_use]
pub fn default_display_name() -> String {
    DEFAULT_DISPLAY_NAME.to_owned()
}

/// Owned listen address used where allocation is required.
#[must_use]
pub fn default_listen_address() -> String {
    DEFAULT_LISTEN_ADDRESS.to_owned()
}

/// Owned log file path used where allocation is required.
#[must_use]
pub fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_owned()
}

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
