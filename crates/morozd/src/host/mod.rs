//! OS bindings that feed the lifecycle controller.
//!
//! Each host owns the control-request channel. Its sending half goes to
//! whatever delivers commands (the Windows service control dispatcher, or
//! console signals) and its receiving half goes to [`ServiceController::run`].
//! Hosts never interpret commands themselves.

mod console;
#[cfg(windows)]
mod windows;

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;

use moroz_config::Config;

use crate::controller::{
    ControlRequest, ControllerExit, LastReport, LoggingStatusReporter, ServiceController,
    StatusReporter,
};
use crate::http::{HttpListener, ListenerError};
use crate::observer::LifecycleObserver;

const HOST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");

/// Errors raised by the OS bindings.
#[derive(Debug, Error)]
pub enum HostError {
    /// Console signal handlers could not be installed.
    #[error("failed to install console signal handlers: {source}")]
    Signals {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The HTTP listener did not shut down cleanly.
    #[error("HTTP listener failed during shutdown: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// The service control dispatcher returned without running the service.
    #[cfg(windows)]
    #[error("service control dispatcher returned without running the service")]
    NoServiceContext,
    /// The service control dispatcher failed.
    #[cfg(windows)]
    #[error("service control dispatcher failed: {source}")]
    Dispatcher {
        /// Underlying platform error.
        #[source]
        source: windows_service::Error,
    },
    /// Registering the control handler with the service manager failed.
    #[cfg(windows)]
    #[error("failed to register service control handler: {source}")]
    Register {
        /// Underlying platform error.
        #[source]
        source: windows_service::Error,
    },
}

impl From<ListenerError> for HostError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}

/// Result of handing the process to the platform service manager.
#[derive(Debug)]
pub(crate) enum HostOutcome {
    /// The service ran and was stopped by the manager.
    Stopped(ControllerExit),
    /// No service manager owns this process; the listener is handed back.
    NoServiceManager(HttpListener),
}

/// Runs one controller against a started listener.
///
/// The listener starts after StartPending is reported and stops once the
/// control loop has exited; Stopped is reported only after it has joined.
pub(crate) async fn drive<R>(
    mut controller: ServiceController<R>,
    listener: HttpListener,
    requests: &mut UnboundedReceiver<ControlRequest>,
) -> Result<ControllerExit, HostError>
where
    R: StatusReporter,
{
    controller.begin();
    let handle = listener.start();
    let exit = controller.run(requests).await;
    handle.shutdown();
    let joined = handle.join().await;
    controller.finish(&exit);
    joined?;
    Ok(exit)
}

/// Runs the controller with console signals standing in for the service
/// manager.
pub(crate) fn run_console(
    runtime: &Runtime,
    config: &Config,
    listener: HttpListener,
    observer: Arc<dyn LifecycleObserver>,
) -> Result<ControllerExit, HostError> {
    let (sender, mut requests) = mpsc::unbounded_channel();
    let last = LastReport::new();
    let control = {
        let _guard = runtime.enter();
        console::ConsoleControl::install(sender, last.clone())?
    };
    info!(
        target: HOST_TARGET,
        service = config.service_name(),
        "console control active"
    );
    let controller = ServiceController::new(
        LoggingStatusReporter::new(last),
        observer,
        config.heartbeat_interval(),
    );
    let outcome = runtime.block_on(drive(controller, listener, &mut requests));
    control.close();
    outcome
}

/// Hands the process to the platform service manager.
#[cfg(windows)]
pub(crate) fn run_managed(
    runtime: &Runtime,
    config: &Config,
    listener: HttpListener,
    observer: Arc<dyn LifecycleObserver>,
) -> Result<HostOutcome, HostError> {
    windows::dispatch(runtime.handle().clone(), config, listener, observer)
}

/// Hands the process to the platform service manager.
///
/// systemd delivers stop requests as signals, so a systemd-launched process
/// is driven through the console bindings.
#[cfg(unix)]
pub(crate) fn run_managed(
    runtime: &Runtime,
    config: &Config,
    listener: HttpListener,
    observer: Arc<dyn LifecycleObserver>,
) -> Result<HostOutcome, HostError> {
    if std::env::var_os(SYSTEMD_INVOCATION_ENV_VAR).is_none() {
        return Ok(HostOutcome::NoServiceManager(listener));
    }
    run_console(runtime, config, listener, observer).map(HostOutcome::Stopped)
}

#[cfg(unix)]
const SYSTEMD_INVOCATION_ENV_VAR: &str = "INVOCATION_ID";

/// Serves HTTP in the foreground until Ctrl+C.
pub(crate) fn run_standalone(runtime: &Runtime, listener: HttpListener) -> Result<(), HostError> {
    runtime.block_on(async {
        let handle = listener.start();
        info!(
            target: HOST_TARGET,
            address = %handle.local_addr(),
            "serving without a service manager; press Ctrl+C to stop"
        );
        let waited = tokio::signal::ctrl_c().await;
        handle.shutdown();
        handle.join().await?;
        waited.map_err(|source| HostError::Signals { source })
    })
}
