//! Console bindings: process signals stand in for service manager commands.

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::controller::{ControlRequest, LastReport};

use super::{HOST_TARGET, HostError};

#[cfg(unix)]
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM, SIGUSR1, SIGUSR2};
#[cfg(unix)]
use signal_hook::iterator::{Handle, Signals};
#[cfg(unix)]
use std::thread::{self, JoinHandle};

/// Translates a console signal into the request it stands for.
///
/// Termination signals stop the service, SIGHUP interrogates it with the
/// last reported status, and the two user signals pause and continue.
#[cfg(unix)]
pub(crate) fn request_for_signal(signal: i32, last: &LastReport) -> ControlRequest {
    match signal {
        SIGINT | SIGTERM | SIGQUIT => ControlRequest::Stop,
        SIGHUP => ControlRequest::Interrogate {
            current: last.get(),
        },
        SIGUSR1 => ControlRequest::Pause,
        SIGUSR2 => ControlRequest::Continue,
        other => ControlRequest::Unknown(other.unsigned_abs()),
    }
}

/// Translates a console signal into the request it stands for.
///
/// Windows consoles only deliver Ctrl+C, which stops the service.
#[cfg(windows)]
pub(crate) fn request_for_signal(_signal: i32, _last: &LastReport) -> ControlRequest {
    ControlRequest::Stop
}

/// Running signal forwarder.
#[cfg(unix)]
pub(crate) struct ConsoleControl {
    handle: Handle,
    thread: JoinHandle<()>,
}

#[cfg(unix)]
impl ConsoleControl {
    pub(crate) fn install(
        sender: UnboundedSender<ControlRequest>,
        last: LastReport,
    ) -> Result<Self, HostError> {
        let mut signals = Signals::new([SIGINT, SIGTERM, SIGQUIT, SIGHUP, SIGUSR1, SIGUSR2])
            .map_err(|source| HostError::Signals { source })?;
        let handle = signals.handle();
        let thread = thread::spawn(move || {
            for signal in signals.forever() {
                let request = request_for_signal(signal, &last);
                debug!(
                    target: HOST_TARGET,
                    signal,
                    request = request.name(),
                    "console signal received"
                );
                if sender.send(request).is_err() {
                    break;
                }
            }
        });
        Ok(Self { handle, thread })
    }

    pub(crate) fn close(self) {
        self.handle.close();
        let _ = self.thread.join();
    }
}

/// Running Ctrl+C forwarder.
#[cfg(windows)]
pub(crate) struct ConsoleControl {
    task: tokio::task::JoinHandle<()>,
}

#[cfg(windows)]
impl ConsoleControl {
    /// Must be called from within the runtime context.
    pub(crate) fn install(
        sender: UnboundedSender<ControlRequest>,
        last: LastReport,
    ) -> Result<Self, HostError> {
        let task = tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                let request = request_for_signal(0, &last);
                debug!(
                    target: HOST_TARGET,
                    request = request.name(),
                    "console interrupt received"
                );
                if sender.send(request).is_err() {
                    break;
                }
            }
        });
        Ok(Self { task })
    }

    pub(crate) fn close(self) {
        self.task.abort();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::controller::{ServiceState, StatusReport};

    #[rstest]
    #[case(SIGINT, ControlRequest::Stop)]
    #[case(SIGTERM, ControlRequest::Stop)]
    #[case(SIGQUIT, ControlRequest::Stop)]
    #[case(SIGUSR1, ControlRequest::Pause)]
    #[case(SIGUSR2, ControlRequest::Continue)]
    fn signals_map_to_lifecycle_commands(#[case] signal: i32, #[case] expected: ControlRequest) {
        assert_eq!(request_for_signal(signal, &LastReport::new()), expected);
    }

    #[test]
    fn hangup_interrogates_with_last_report() {
        let last = LastReport::new();
        let paused = StatusReport::for_state(ServiceState::Paused);
        last.set(paused);

        assert_eq!(
            request_for_signal(SIGHUP, &last),
            ControlRequest::Interrogate { current: paused }
        );
    }

    #[test]
    fn unmapped_signals_are_unknown() {
        assert_eq!(
            request_for_signal(64, &LastReport::new()),
            ControlRequest::Unknown(64)
        );
    }
}
