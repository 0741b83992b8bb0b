//! Scenario world driving a controller on a paused clock.

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use rstest::fixture;
use tokio::runtime::Builder;
use tokio::sync::mpsc;
use tokio::time;

use crate::controller::{
    ControlRequest, ControllerExit, ServiceController, ServiceState, StatusReport,
};

use super::journal::{Journal, RecordingObserver, RecordingReporter};

/// Upper bound on a scenario run when no stop request ends it sooner.
const DEFAULT_RUN_LIMIT: Duration = Duration::from_secs(3600);

/// Scenario world shared across lifecycle steps.
#[derive(Debug)]
pub struct ControllerWorld {
    pub journal: Journal,
    heartbeat: Option<Duration>,
    requests: Vec<ControlRequest>,
    exit: Option<ControllerExit>,
    final_state: Option<ServiceState>,
}

impl ControllerWorld {
    fn new() -> Self {
        Self {
            journal: Journal::default(),
            heartbeat: None,
            requests: Vec::new(),
            exit: None,
            final_state: None,
        }
    }

    pub fn set_heartbeat(&mut self, heartbeat: Option<Duration>) {
        self.heartbeat = heartbeat;
    }

    pub fn queue(&mut self, requests: impl IntoIterator<Item = ControlRequest>) {
        self.requests.extend(requests);
    }

    /// Status the service manager holds before the controller starts.
    pub fn initial_status() -> StatusReport {
        StatusReport::for_state(ServiceState::StartPending)
    }

    /// Runs the controller for at most `limit` of virtual time.
    ///
    /// Queued requests are delivered before the loop starts and the sender
    /// stays open, so the loop ends only on Stop or Shutdown.
    pub fn run_for(&mut self, limit: Option<Duration>) {
        let runtime = Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .expect("test runtime");
        let journal = self.journal.clone();
        let heartbeat = self.heartbeat;
        let requests = self.requests.clone();

        let (exit, state) = runtime.block_on(async move {
            let (sender, mut receiver) = mpsc::unbounded_channel();
            for request in requests {
                sender.send(request).expect("receiver is alive");
            }
            let mut controller = ServiceController::new(
                RecordingReporter::new(journal.clone()),
                Arc::new(RecordingObserver::new(journal)),
                heartbeat,
            );
            let limit = limit.unwrap_or(DEFAULT_RUN_LIMIT);
            let exit = time::timeout(limit, controller.run(&mut receiver))
                .await
                .ok();
            drop(sender);
            match exit {
                Some(exit) => {
                    controller.finish(&exit);
                    (Some(exit), ServiceState::Stopped)
                }
                None => (None, controller.state()),
            }
        });
        self.exit = exit;
        self.final_state = Some(state);
    }

    /// Loop exit, or `None` while the controller was still running.
    pub fn exit(&self) -> Option<ControllerExit> {
        self.exit
    }

    /// State the controller ended the run in.
    pub fn final_state(&self) -> Option<ServiceState> {
        self.final_state
    }
}

/// Fixture providing a fresh controller world.
#[fixture]
pub fn world() -> RefCell<ControllerWorld> {
    RefCell::new(ControllerWorld::new())
}
