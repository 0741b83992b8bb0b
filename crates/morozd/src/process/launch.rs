//! Supervises service launch sequencing and runtime orchestration.

use std::env;
use std::ffi::OsString;
use std::sync::Arc;

use tokio::runtime::Builder;
use tracing::info;

use moroz_config::{Config, LogFilePath};

use crate::bootstrap::{ConfigLoader, SystemConfigLoader};
use crate::controller::ControllerExit;
use crate::host::{self, HostOutcome};
use crate::http::HttpListener;
use crate::observer::{LifecycleObserver, StructuredLifecycleObserver};
use crate::telemetry::{self, LogSink};

use super::errors::LaunchError;
use super::files::open_log_file;
use super::{DEBUG_ENV_VAR, PROCESS_TARGET};

/// Run mode for the service host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Console signals drive the controller and logs are mirrored to stderr.
    Debug,
    /// The platform service manager drives the controller.
    Managed,
}

impl LaunchMode {
    /// Selects Debug when configuration asks for it or `DEBUG` is set.
    #[must_use]
    pub fn detect(config: &Config) -> Self {
        Self::from_sources(config, env::var_os(DEBUG_ENV_VAR))
    }

    fn from_sources(config: &Config, debug_env: Option<OsString>) -> Self {
        if config.debug() || debug_env.is_some_and(|value| !value.is_empty()) {
            Self::Debug
        } else {
            Self::Managed
        }
    }
}

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The controller was stopped through its control channel.
    Stopped(ControllerExit),
    /// No service manager owned the process; it served until interrupted.
    Standalone,
}

impl RunOutcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Stopped(exit) => u8::try_from(exit.exit_code()).unwrap_or(u8::MAX),
            Self::Standalone => 0,
        }
    }
}

/// Runs the service using the production collaborators.
pub fn run_service() -> Result<RunOutcome, LaunchError> {
    run_service_with(
        &SystemConfigLoader,
        Arc::new(StructuredLifecycleObserver::new()),
    )
}

/// Runs the service with injected collaborators.
pub(crate) fn run_service_with<L>(
    loader: &L,
    observer: Arc<dyn LifecycleObserver>,
) -> Result<RunOutcome, LaunchError>
where
    L: ConfigLoader + ?Sized,
{
    let config = loader.load()?;
    let mode = LaunchMode::detect(&config);
    let working_dir =
        env::current_dir().map_err(|source| LaunchError::WorkingDirectory { source })?;
    let log_path = LogFilePath::resolve(&config, &working_dir)?;
    let log = open_log_file(log_path.as_path())?;
    telemetry::initialise(&config, LogSink::new(log, mode == LaunchMode::Debug))?;
    info!(
        target: PROCESS_TARGET,
        ?mode,
        service = config.service_name(),
        log_file = %log_path.as_path().display(),
        "starting service host"
    );

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|source| LaunchError::Runtime { source })?;
    let listener = runtime.block_on(HttpListener::bind(config.listen_address()))?;

    let outcome = match mode {
        LaunchMode::Debug => {
            host::run_console(&runtime, &config, listener, observer).map(RunOutcome::Stopped)?
        }
        LaunchMode::Managed => match host::run_managed(&runtime, &config, listener, observer)? {
            HostOutcome::Stopped(exit) => RunOutcome::Stopped(exit),
            HostOutcome::NoServiceManager(listener) => {
                host::run_standalone(&runtime, listener)?;
                RunOutcome::Standalone
            }
        },
    };
    info!(
        target: PROCESS_TARGET,
        ?outcome,
        "shutdown sequence completed"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::controller::ExitReason;

    #[rstest]
    #[case(false, None, LaunchMode::Managed)]
    #[case(false, Some(""), LaunchMode::Managed)]
    #[case(false, Some("1"), LaunchMode::Debug)]
    #[case(true, None, LaunchMode::Debug)]
    fn mode_follows_config_and_debug_variable(
        #[case] debug: bool,
        #[case] env_value: Option<&str>,
        #[case] expected: LaunchMode,
    ) {
        let config = Config {
            debug,
            ..Config::default()
        };
        assert_eq!(
            LaunchMode::from_sources(&config, env_value.map(OsString::from)),
            expected
        );
    }

    #[rstest]
    #[case(RunOutcome::Standalone, 0)]
    #[case(RunOutcome::Stopped(ControllerExit { reason: ExitReason::Stop }), 1)]
    #[case(RunOutcome::Stopped(ControllerExit { reason: ExitReason::ControlChannelClosed }), 1)]
    fn outcomes_map_to_exit_codes(#[case] outcome: RunOutcome, #[case] expected: u8) {
        assert_eq!(outcome.exit_code(), expected);
    }
}
