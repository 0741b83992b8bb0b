//! Recording doubles for [`StatusReporter`] and [`LifecycleObserver`].
//!
//! Both doubles write into one shared [`Journal`] so tests can assert on the
//! interleaving of status reports and lifecycle events.

use std::sync::{Arc, Mutex};

use crate::controller::{
    ControlRequest, ControllerExit, ReportError, ServiceState, StatusReport, StatusReporter,
};
use crate::observer::LifecycleObserver;

/// Everything the controller told its collaborators, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A status record reached the reporter.
    Reported(StatusReport),
    /// The terminal Stopped record with its exit code.
    ReportedStopped(u32),
    /// The controller began its start-up sequence.
    Starting,
    /// The controller moved between states.
    StateChanged { from: ServiceState, to: ServiceState },
    /// The periodic task ran for the nth time.
    Heartbeat(u64),
    /// An unrecognised control code arrived.
    Unexpected(u32),
    /// A known request was refused in the given state.
    Rejected {
        request: ControlRequest,
        state: ServiceState,
    },
    /// The reporter refused a record.
    ReportFailed(String),
    /// Every request sender was dropped.
    ChannelClosed,
    /// The control loop returned.
    Stopped(ControllerExit),
}

/// Shared, ordered event log.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<LifecycleEvent>>>,
}

impl Journal {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().expect("journal mutex poisoned").clone()
    }

    pub fn record(&self, event: LifecycleEvent) {
        self.events
            .lock()
            .expect("journal mutex poisoned")
            .push(event);
    }

    /// States of every status record pushed to the reporter, in order.
    #[must_use]
    pub fn reported_states(&self) -> Vec<ServiceState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                LifecycleEvent::Reported(status) => Some(status.state),
                LifecycleEvent::ReportedStopped(_) => Some(ServiceState::Stopped),
                _ => None,
            })
            .collect()
    }

    /// Number of times the periodic task ran.
    #[must_use]
    pub fn heartbeats(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, LifecycleEvent::Heartbeat(_)))
            .count()
    }
}

/// Reporter that records every status record it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    journal: Journal,
    refuse: Option<ServiceState>,
}

impl RecordingReporter {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            refuse: None,
        }
    }

    /// Makes every report of `state` fail after it is recorded.
    pub fn refusing(mut self, state: ServiceState) -> Self {
        self.refuse = Some(state);
        self
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&mut self, status: StatusReport) -> Result<(), ReportError> {
        self.journal.record(LifecycleEvent::Reported(status));
        if self.refuse == Some(status.state) {
            return Err(ReportError::Backend {
                state: status.state,
                source: "service manager unavailable".into(),
            });
        }
        Ok(())
    }

    fn report_stopped(&mut self, exit_code: u32) -> Result<(), ReportError> {
        self.journal.record(LifecycleEvent::ReportedStopped(exit_code));
        Ok(())
    }
}

/// Observer that records lifecycle events.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    journal: Journal,
}

impl RecordingObserver {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl LifecycleObserver for RecordingObserver {
    fn controller_starting(&self) {
        self.journal.record(LifecycleEvent::Starting);
    }

    fn state_changed(&self, from: ServiceState, to: ServiceState) {
        self.journal
            .record(LifecycleEvent::StateChanged { from, to });
    }

    fn heartbeat(&self, count: u64) {
        self.journal.record(LifecycleEvent::Heartbeat(count));
    }

    fn unexpected_control(&self, code: u32) {
        self.journal.record(LifecycleEvent::Unexpected(code));
    }

    fn control_rejected(&self, request: ControlRequest, state: ServiceState) {
        self.journal
            .record(LifecycleEvent::Rejected { request, state });
    }

    fn report_failed(&self, error: &ReportError) {
        self.journal
            .record(LifecycleEvent::ReportFailed(error.to_string()));
    }

    fn control_channel_closed(&self) {
        self.journal.record(LifecycleEvent::ChannelClosed);
    }

    fn controller_stopped(&self, exit: &ControllerExit) {
        self.journal.record(LifecycleEvent::Stopped(*exit));
    }
}
