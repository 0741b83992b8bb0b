//! Async adapter that feeds the transition function and applies its effects.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::observer::LifecycleObserver;

use super::machine::{ControlEvent, Effect, step};
use super::reporter::StatusReporter;
use super::state::{ControlRequest, ControllerExit, ExitReason, ServiceState, StatusReport};
use super::ticker::Ticker;

/// Lifecycle controller driving one service instance.
///
/// The controller owns the service state and the periodic task. Requests
/// arrive on an unbounded channel so OS callback threads never block; the
/// loop itself waits only on the next request or tick.
pub struct ServiceController<R> {
    reporter: R,
    observer: Arc<dyn LifecycleObserver>,
    ticker: Ticker,
    state: ServiceState,
    begun: bool,
}

enum Wake {
    Event(ControlEvent),
    Closed,
}

impl<R> ServiceController<R>
where
    R: StatusReporter,
{
    /// Builds a controller; `heartbeat` enables the periodic task.
    #[must_use]
    pub fn new(
        reporter: R,
        observer: Arc<dyn LifecycleObserver>,
        heartbeat: Option<Duration>,
    ) -> Self {
        Self {
            reporter,
            observer,
            ticker: Ticker::new(heartbeat),
            state: ServiceState::StartPending,
            begun: false,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ServiceState {
        self.state
    }

    /// Reports StartPending so the host can finish its own setup.
    ///
    /// Calling it more than once has no further effect.
    pub fn begin(&mut self) {
        if self.begun {
            return;
        }
        self.begun = true;
        self.observer.controller_starting();
        self.publish(StatusReport::for_state(ServiceState::StartPending));
    }

    /// Runs the control loop until Stop, Shutdown or channel closure.
    ///
    /// StartPending (unless [`begin`](Self::begin) already sent it) and
    /// Running are both reported before the first request is read. On return
    /// the controller is in StopPending with the periodic task disarmed.
    pub async fn run(
        &mut self,
        requests: &mut UnboundedReceiver<ControlRequest>,
    ) -> ControllerExit {
        self.begin();
        let mut pending = self.apply(ControlEvent::Started);

        let reason = loop {
            if let Some(reason) = pending {
                break reason;
            }
            let wake = tokio::select! {
                biased;
                request = requests.recv() => request.map_or(Wake::Closed, |received| {
                    Wake::Event(ControlEvent::Request(received))
                }),
                () = self.ticker.tick() => Wake::Event(ControlEvent::Tick),
            };
            pending = match wake {
                Wake::Event(event) => self.apply(event),
                Wake::Closed => {
                    self.observer.control_channel_closed();
                    self.apply(ControlEvent::Request(ControlRequest::Shutdown))
                        .map(|_| ExitReason::ControlChannelClosed)
                }
            };
        };

        let exit = ControllerExit { reason };
        self.observer.controller_stopped(&exit);
        exit
    }

    /// Reports Stopped once the host has torn everything down.
    pub fn finish(mut self, exit: &ControllerExit) {
        if let Err(error) = self.reporter.report_stopped(exit.exit_code()) {
            self.observer.report_failed(&error);
        }
        self.enter(ServiceState::Stopped);
    }

    fn apply(&mut self, event: ControlEvent) -> Option<ExitReason> {
        let transition = step(self.state, event);
        for effect in &transition.effects {
            match *effect {
                Effect::Report(status) => self.publish(status),
                Effect::ArmTimer => self.ticker.arm(),
                Effect::DisarmTimer => self.ticker.disarm(),
                Effect::RunPeriodic => {
                    let count = self.ticker.record();
                    self.observer.heartbeat(count);
                }
                Effect::Unexpected(code) => self.observer.unexpected_control(code),
                Effect::Rejected(request) => self.observer.control_rejected(request, self.state),
                Effect::Exit(_) => {}
            }
        }
        self.enter(transition.state);
        transition.exits()
    }

    fn enter(&mut self, next: ServiceState) {
        if next != self.state {
            self.observer.state_changed(self.state, next);
            self.state = next;
        }
    }

    fn publish(&mut self, status: StatusReport) {
        if let Err(error) = self.reporter.report(status) {
            self.observer.report_failed(&error);
        }
    }
}
