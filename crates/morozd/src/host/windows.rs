//! Windows Service Control Manager bindings.

use std::ffi::OsString;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{error, info};
use windows_service::service::{
    ServiceControl, ServiceControlAccept, ServiceExitCode, ServiceState as NativeState,
    ServiceStatus, ServiceType,
};
use windows_service::service_control_handler::{
    self, ServiceControlHandlerResult, ServiceStatusHandle,
};
use windows_service::{define_windows_service, service_dispatcher};

use moroz_config::Config;

use crate::controller::{
    AcceptedCommands, ControlRequest, ControllerExit, LastReport, ReportError, ServiceController,
    ServiceState, StatusReport, StatusReporter,
};
use crate::http::HttpListener;
use crate::observer::LifecycleObserver;

use super::{HOST_TARGET, HostError, HostOutcome, drive};

/// `ERROR_FAILED_SERVICE_CONTROLLER_CONNECT`: the process was not started
/// by the Service Control Manager.
const NOT_STARTED_BY_SCM: i32 = 1063;
const PENDING_WAIT_HINT: Duration = Duration::from_secs(10);

struct Session {
    service_name: String,
    heartbeat: Option<Duration>,
    runtime: Handle,
    listener: HttpListener,
    observer: Arc<dyn LifecycleObserver>,
}

// The dispatcher calls `service_main` on its own thread with no user data,
// so the session is parked here until that thread claims it.
static SESSION: Mutex<Option<Session>> = Mutex::new(None);
static OUTCOME: Mutex<Option<Result<ControllerExit, HostError>>> = Mutex::new(None);

define_windows_service!(ffi_service_main, service_main);

fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Blocks in the SCM dispatcher until the service stops.
pub(super) fn dispatch(
    runtime: Handle,
    config: &Config,
    listener: HttpListener,
    observer: Arc<dyn LifecycleObserver>,
) -> Result<HostOutcome, HostError> {
    let service_name = config.service_name().to_owned();
    *lock(&SESSION) = Some(Session {
        service_name: service_name.clone(),
        heartbeat: config.heartbeat_interval(),
        runtime,
        listener,
        observer,
    });

    match service_dispatcher::start(&service_name, ffi_service_main) {
        Ok(()) => lock(&OUTCOME)
            .take()
            .unwrap_or(Err(HostError::NoServiceContext))
            .map(HostOutcome::Stopped),
        Err(windows_service::Error::Winapi(source))
            if source.raw_os_error() == Some(NOT_STARTED_BY_SCM) =>
        {
            info!(
                target: HOST_TARGET,
                service = %service_name,
                "not started by the service control manager"
            );
            lock(&SESSION)
                .take()
                .map(|session| HostOutcome::NoServiceManager(session.listener))
                .ok_or(HostError::NoServiceContext)
        }
        Err(source) => {
            lock(&SESSION).take();
            Err(HostError::Dispatcher { source })
        }
    }
}

fn service_main(_arguments: Vec<OsString>) {
    let Some(session) = lock(&SESSION).take() else {
        return;
    };
    let outcome = run_session(session);
    if let Err(failure) = &outcome {
        error!(
            target: HOST_TARGET,
            error = %failure,
            "service session failed"
        );
    }
    *lock(&OUTCOME) = Some(outcome);
}

fn run_session(session: Session) -> Result<ControllerExit, HostError> {
    let Session {
        service_name,
        heartbeat,
        runtime,
        listener,
        observer,
    } = session;
    let (sender, mut requests) = mpsc::unbounded_channel();
    let last = LastReport::new();
    let interrogated = last.clone();

    let handler = move |control: ServiceControl| -> ServiceControlHandlerResult {
        let request = match control {
            ServiceControl::Interrogate => ControlRequest::Interrogate {
                current: interrogated.get(),
            },
            ServiceControl::Stop => ControlRequest::Stop,
            ServiceControl::Shutdown => ControlRequest::Shutdown,
            ServiceControl::Pause => ControlRequest::Pause,
            ServiceControl::Continue => ControlRequest::Continue,
            other => ControlRequest::Unknown(other.raw_service_control_type()),
        };
        let handled = !matches!(request, ControlRequest::Unknown(_));
        // A closed channel means the loop already exited; Stopped follows.
        let _ = sender.send(request);
        if handled {
            ServiceControlHandlerResult::NoError
        } else {
            ServiceControlHandlerResult::NotImplemented
        }
    };

    let status = service_control_handler::register(&service_name, handler)
        .map_err(|source| HostError::Register { source })?;
    let controller =
        ServiceController::new(ScmStatusReporter::new(status, last), observer, heartbeat);
    runtime.block_on(drive(controller, listener, &mut requests))
}

/// Pushes status records to the SCM through the registered handle.
struct ScmStatusReporter {
    handle: ServiceStatusHandle,
    last: LastReport,
    checkpoint: u32,
}

impl ScmStatusReporter {
    fn new(handle: ServiceStatusHandle, last: LastReport) -> Self {
        Self {
            handle,
            last,
            checkpoint: 0,
        }
    }

    fn push(&mut self, status: StatusReport, exit_code: u32) -> Result<(), ReportError> {
        let pending = matches!(
            status.state,
            ServiceState::StartPending | ServiceState::StopPending
        );
        self.checkpoint = if pending { self.checkpoint + 1 } else { 0 };
        let native = ServiceStatus {
            service_type: ServiceType::OWN_PROCESS,
            current_state: native_state(status.state),
            controls_accepted: native_accepts(status.accepts),
            exit_code: ServiceExitCode::Win32(exit_code),
            checkpoint: self.checkpoint,
            wait_hint: if pending {
                PENDING_WAIT_HINT
            } else {
                Duration::default()
            },
            process_id: None,
        };
        self.handle
            .set_service_status(native)
            .map_err(|source| ReportError::Backend {
                state: status.state,
                source: Box::new(source),
            })?;
        self.last.set(status);
        Ok(())
    }
}

impl StatusReporter for ScmStatusReporter {
    fn report(&mut self, status: StatusReport) -> Result<(), ReportError> {
        self.push(status, 0)
    }

    fn report_stopped(&mut self, exit_code: u32) -> Result<(), ReportError> {
        self.push(StatusReport::for_state(ServiceState::Stopped), exit_code)
    }
}

fn native_state(state: ServiceState) -> NativeState {
    match state {
        ServiceState::StartPending => NativeState::StartPending,
        ServiceState::Running => NativeState::Running,
        ServiceState::Paused => NativeState::Paused,
        ServiceState::StopPending => NativeState::StopPending,
        ServiceState::Stopped => NativeState::Stopped,
    }
}

fn native_accepts(accepts: AcceptedCommands) -> ServiceControlAccept {
    let mut native = ServiceControlAccept::empty();
    if accepts.contains(AcceptedCommands::STOP) {
        native |= ServiceControlAccept::STOP;
    }
    if accepts.contains(AcceptedCommands::SHUTDOWN) {
        native |= ServiceControlAccept::SHUTDOWN;
    }
    if accepts.contains(AcceptedCommands::PAUSE_CONTINUE) {
        native |= ServiceControlAccept::PAUSE_CONTINUE;
    }
    native
}
