//! Structured telemetry initialisation for the service host.

use std::fs::File;
use std::io;
use std::sync::Mutex;

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter, writer::MakeWriterExt};

use moroz_config::{Config, LogFormat};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Destination for log records.
#[derive(Debug)]
pub struct LogSink {
    file: File,
    mirror_stderr: bool,
}

impl LogSink {
    /// Writes every record to `file`; `mirror_stderr` also copies them to
    /// the console.
    #[must_use]
    pub const fn new(file: File, mirror_stderr: bool) -> Self {
        Self {
            file,
            mirror_stderr,
        }
    }

    fn into_writer(self) -> BoxMakeWriter {
        let file = Mutex::new(self.file);
        if self.mirror_stderr {
            BoxMakeWriter::new(file.and(io::stderr))
        } else {
            BoxMakeWriter::new(file)
        }
    }
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Repeated calls are idempotent: only the first sink is installed and later
/// sinks are dropped.
pub fn initialise(config: &Config, sink: LogSink) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| {
            let subscriber = build_subscriber(config, sink)?;
            tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
        })
        .map(|_| TelemetryHandle)
}

fn build_subscriber(
    config: &Config,
    sink: LogSink,
) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = |filter: EnvFilter, writer: BoxMakeWriter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(writer)
            // The log file is the primary sink; colour codes would corrupt it.
            .with_ansi(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let writer = sink.into_writer();
    Ok(match config.log_format() {
        LogFormat::Json => Box::new(builder(filter, writer).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter, writer).compact().finish()),
    })
}
