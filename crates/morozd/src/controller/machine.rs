//! Pure lifecycle transition function.
//!
//! [`step`] maps the current state and one event to the next state and the
//! ordered list of effects the runner must apply. It performs no I/O, so the
//! full transition table can be exercised without an OS service manager.

use super::state::{ControlRequest, ExitReason, ServiceState, StatusReport};

/// Input consumed by one iteration of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Setup finished; the service may start serving.
    Started,
    /// A request from the OS service manager.
    Request(ControlRequest),
    /// The periodic task's interval elapsed.
    Tick,
}

/// Side effect requested by a transition, applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Push a status record to the service manager.
    Report(StatusReport),
    /// Start the periodic task.
    ArmTimer,
    /// Stop the periodic task.
    DisarmTimer,
    /// Run the periodic action once.
    RunPeriodic,
    /// Record an unrecognised control code.
    Unexpected(u32),
    /// Record a known command that is not accepted in the current state.
    Rejected(ControlRequest),
    /// Leave the control loop.
    Exit(ExitReason),
}

/// Outcome of a single transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the event.
    pub state: ServiceState,
    /// Effects to apply, in order.
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(state: ServiceState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn to(state: ServiceState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    /// Whether the transition ends the control loop.
    #[must_use]
    pub fn exits(&self) -> Option<ExitReason> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::Exit(reason) => Some(*reason),
            _ => None,
        })
    }
}

/// Computes the transition for `event` in `state`.
#[must_use]
pub fn step(state: ServiceState, event: ControlEvent) -> Transition {
    match event {
        ControlEvent::Started => on_started(state),
        ControlEvent::Tick => on_tick(state),
        ControlEvent::Request(request) => on_request(state, request),
    }
}

fn on_started(state: ServiceState) -> Transition {
    match state {
        ServiceState::StartPending => Transition::to(
            ServiceState::Running,
            vec![
                Effect::Report(StatusReport::for_state(ServiceState::Running)),
                Effect::ArmTimer,
            ],
        ),
        _ => Transition::stay(state),
    }
}

fn on_tick(state: ServiceState) -> Transition {
    match state {
        ServiceState::Running => Transition::to(state, vec![Effect::RunPeriodic]),
        _ => Transition::stay(state),
    }
}

fn on_request(state: ServiceState, request: ControlRequest) -> Transition {
    match (state, request) {
        (_, ControlRequest::Interrogate { current }) => {
            Transition::to(state, vec![Effect::Report(current)])
        }
        (_, ControlRequest::Unknown(code)) => Transition::to(state, vec![Effect::Unexpected(code)]),
        (ServiceState::Running, ControlRequest::Pause) => Transition::to(
            ServiceState::Paused,
            vec![
                Effect::Report(StatusReport::for_state(ServiceState::Paused)),
                Effect::DisarmTimer,
            ],
        ),
        (ServiceState::Paused, ControlRequest::Continue) => Transition::to(
            ServiceState::Running,
            vec![
                Effect::Report(StatusReport::for_state(ServiceState::Running)),
                Effect::ArmTimer,
            ],
        ),
        // Repeated pause or continue re-affirms the current state without
        // touching the timer.
        (ServiceState::Paused, ControlRequest::Pause)
        | (ServiceState::Running, ControlRequest::Continue) => {
            Transition::to(state, vec![Effect::Report(StatusReport::for_state(state))])
        }
        (
            ServiceState::Running | ServiceState::Paused,
            ControlRequest::Stop | ControlRequest::Shutdown,
        ) => {
            let reason = if matches!(request, ControlRequest::Stop) {
                ExitReason::Stop
            } else {
                ExitReason::Shutdown
            };
            Transition::to(
                ServiceState::StopPending,
                vec![
                    Effect::Report(StatusReport::for_state(ServiceState::StopPending)),
                    Effect::DisarmTimer,
                    Effect::Exit(reason),
                ],
            )
        }
        (
            ServiceState::StartPending | ServiceState::StopPending | ServiceState::Stopped,
            ControlRequest::Stop
            | ControlRequest::Shutdown
            | ControlRequest::Pause
            | ControlRequest::Continue,
        ) => Transition::to(state, vec![Effect::Rejected(request)]),
    }
}
