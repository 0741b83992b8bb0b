//! Lifecycle vocabulary shared by the state machine and the OS bindings.

use std::fmt;

use bitflags::bitflags;

/// Externally visible lifecycle state of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    /// Setup is in progress; no commands are honoured yet.
    StartPending,
    /// Serving and honouring the accepted command set.
    Running,
    /// Suspended; only the periodic task is halted.
    Paused,
    /// The control loop has exited and teardown is underway.
    StopPending,
    /// Terminal state reported by the host after teardown.
    Stopped,
}

impl ServiceState {
    /// Lower-case label used in structured logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartPending => "start_pending",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::StopPending => "stop_pending",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

bitflags! {
    /// Control commands the service declares it will honour.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AcceptedCommands: u8 {
        /// Stop requested by an operator.
        const STOP = 0b0001;
        /// System shutdown in progress.
        const SHUTDOWN = 0b0010;
        /// Pause and continue, always declared together.
        const PAUSE_CONTINUE = 0b0100;
    }
}

impl AcceptedCommands {
    /// The fixed set declared while Running or Paused.
    pub const LIFECYCLE: Self = Self::STOP
        .union(Self::SHUTDOWN)
        .union(Self::PAUSE_CONTINUE);
}

/// Status record pushed to the OS service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusReport {
    /// Reported lifecycle state.
    pub state: ServiceState,
    /// Commands the service will honour in that state.
    pub accepts: AcceptedCommands,
}

impl StatusReport {
    /// Builds a report carrying the accepted set appropriate for `state`.
    #[must_use]
    pub fn for_state(state: ServiceState) -> Self {
        let accepts = match state {
            ServiceState::Running | ServiceState::Paused => AcceptedCommands::LIFECYCLE,
            ServiceState::StartPending | ServiceState::StopPending | ServiceState::Stopped => {
                AcceptedCommands::empty()
            }
        };
        Self { state, accepts }
    }
}

/// Control request delivered by the OS service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    /// Asks for the current status; `current` is echoed back verbatim.
    Interrogate {
        /// Status value supplied by the caller.
        current: StatusReport,
    },
    /// Stop the service.
    Stop,
    /// The system is shutting down.
    Shutdown,
    /// Suspend the periodic task.
    Pause,
    /// Resume after a pause.
    Continue,
    /// A control code the service does not recognise.
    Unknown(u32),
}

impl ControlRequest {
    /// Short label used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Interrogate { .. } => "interrogate",
            Self::Stop => "stop",
            Self::Shutdown => "shutdown",
            Self::Pause => "pause",
            Self::Continue => "continue",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Reason the control loop terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// A Stop request was honoured.
    Stop,
    /// A Shutdown request was honoured.
    Shutdown,
    /// Every control request sender was dropped.
    ControlChannelClosed,
}

/// Exit code reported when the service must not be restarted automatically.
pub const NO_RESTART_EXIT_CODE: u32 = 1;

/// Result of a completed control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerExit {
    /// Why the loop stopped.
    pub reason: ExitReason,
}

impl ControllerExit {
    /// Exit code handed back to the service manager.
    ///
    /// Every orderly stop uses [`NO_RESTART_EXIT_CODE`]: the operator or the
    /// system asked for it, so a supervisor must not bring the service back.
    #[must_use]
    pub const fn exit_code(&self) -> u32 {
        NO_RESTART_EXIT_CODE
    }
}
