//! Timing and channel behaviour of the async control loop.

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use tokio::sync::mpsc;
use tokio::time::{self, sleep};

use crate::controller::{
    ControlRequest, ExitReason, ServiceController, ServiceState, StatusReport,
};

use super::support::{Journal, LifecycleEvent, RecordingObserver, RecordingReporter};

const PERIOD: Duration = Duration::from_secs(10);

fn controller(
    journal: &Journal,
    heartbeat: Option<Duration>,
) -> ServiceController<RecordingReporter> {
    ServiceController::new(
        RecordingReporter::new(journal.clone()),
        Arc::new(RecordingObserver::new(journal.clone())),
        heartbeat,
    )
}

#[tokio::test(start_paused = true)]
async fn heartbeat_runs_only_while_running() {
    let journal = Journal::default();
    let mut controller = controller(&journal, Some(PERIOD));
    let (sender, mut requests) = mpsc::unbounded_channel();
    let task = tokio::spawn(async move { controller.run(&mut requests).await });

    sleep(Duration::from_secs(35)).await;
    assert_eq!(journal.heartbeats(), 3);

    sender.send(ControlRequest::Pause).expect("controller alive");
    sleep(Duration::from_secs(50)).await;
    assert_eq!(journal.heartbeats(), 3, "no heartbeat while paused");

    sender.send(ControlRequest::Continue).expect("controller alive");
    sleep(Duration::from_secs(25)).await;
    assert_eq!(journal.heartbeats(), 5);

    sender.send(ControlRequest::Stop).expect("controller alive");
    let exit = task.await.expect("controller task");
    assert_eq!(exit.reason, ExitReason::Stop);

    let events = journal.events();
    let paused_at = events
        .iter()
        .position(|event| {
            *event == LifecycleEvent::Reported(StatusReport::for_state(ServiceState::Paused))
        })
        .expect("paused report");
    assert_eq!(
        events.get(paused_at - 1),
        Some(&LifecycleEvent::Heartbeat(3))
    );
    assert!(events.contains(&LifecycleEvent::Heartbeat(5)));
}

#[tokio::test(start_paused = true)]
async fn controller_keeps_running_without_stop() {
    let journal = Journal::default();
    let mut controller = controller(&journal, None);
    let (sender, mut requests) = mpsc::unbounded_channel();

    let outcome = time::timeout(Duration::from_secs(3600), controller.run(&mut requests)).await;

    assert!(outcome.is_err(), "loop must not exit on its own");
    assert_eq!(controller.state(), ServiceState::Running);
    drop(sender);
}

#[rstest]
#[case(ControlRequest::Stop, ExitReason::Stop)]
#[case(ControlRequest::Shutdown, ExitReason::Shutdown)]
#[tokio::test(start_paused = true)]
async fn stop_while_paused_ends_the_loop(
    #[case] request: ControlRequest,
    #[case] expected: ExitReason,
) {
    let journal = Journal::default();
    let mut controller = controller(&journal, Some(PERIOD));
    let (sender, mut requests) = mpsc::unbounded_channel();
    sender.send(ControlRequest::Pause).expect("queued");
    sender.send(request).expect("queued");

    let exit = controller.run(&mut requests).await;

    assert_eq!(exit.reason, expected);
    assert_eq!(controller.state(), ServiceState::StopPending);
    assert_eq!(
        journal.reported_states(),
        vec![
            ServiceState::StartPending,
            ServiceState::Running,
            ServiceState::Paused,
            ServiceState::StopPending,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn closed_channel_is_treated_as_shutdown() {
    let journal = Journal::default();
    let mut controller = controller(&journal, Some(PERIOD));
    let (sender, mut requests) = mpsc::unbounded_channel::<ControlRequest>();
    drop(sender);

    let exit = controller.run(&mut requests).await;

    assert_eq!(exit.reason, ExitReason::ControlChannelClosed);
    let events = journal.events();
    assert!(events.contains(&LifecycleEvent::ChannelClosed));
    assert_eq!(
        journal.reported_states().last(),
        Some(&ServiceState::StopPending)
    );
}

#[tokio::test(start_paused = true)]
async fn finish_reports_stopped_with_no_restart_code() {
    let journal = Journal::default();
    let mut controller = controller(&journal, None);
    let (sender, mut requests) = mpsc::unbounded_channel();
    sender.send(ControlRequest::Stop).expect("queued");

    let exit = controller.run(&mut requests).await;
    controller.finish(&exit);

    let events = journal.events();
    assert!(events.contains(&LifecycleEvent::ReportedStopped(1)));
    assert_eq!(
        events.last(),
        Some(&LifecycleEvent::StateChanged {
            from: ServiceState::StopPending,
            to: ServiceState::Stopped,
        })
    );
}

#[tokio::test(start_paused = true)]
async fn interrogation_echoes_the_supplied_status() {
    let journal = Journal::default();
    let mut controller = controller(&journal, None);
    let (sender, mut requests) = mpsc::unbounded_channel();
    let supplied = StatusReport::for_state(ServiceState::Paused);
    sender
        .send(ControlRequest::Interrogate { current: supplied })
        .expect("queued");
    sender.send(ControlRequest::Stop).expect("queued");

    controller.run(&mut requests).await;

    let events = journal.events();
    assert!(events.contains(&LifecycleEvent::Reported(supplied)));
    assert!(
        !events.iter().any(|event| matches!(
            event,
            LifecycleEvent::StateChanged {
                to: ServiceState::Paused,
                ..
            }
        )),
        "interrogation must not change state"
    );
}

#[tokio::test(start_paused = true)]
async fn refused_reports_are_observed_and_the_loop_continues() {
    let journal = Journal::default();
    let mut controller = ServiceController::new(
        RecordingReporter::new(journal.clone()).refusing(ServiceState::Running),
        Arc::new(RecordingObserver::new(journal.clone())),
        None,
    );
    let (sender, mut requests) = mpsc::unbounded_channel();
    sender.send(ControlRequest::Stop).expect("queued");

    let exit = controller.run(&mut requests).await;

    assert_eq!(exit.reason, ExitReason::Stop);
    let failures = journal
        .events()
        .into_iter()
        .filter(|event| matches!(event, LifecycleEvent::ReportFailed(_)))
        .count();
    assert_eq!(failures, 1);
}

#[tokio::test(start_paused = true)]
async fn begin_reports_start_pending_once() {
    let journal = Journal::default();
    let mut controller = controller(&journal, None);
    controller.begin();
    controller.begin();
    let (sender, mut requests) = mpsc::unbounded_channel();
    sender.send(ControlRequest::Stop).expect("queued");

    controller.run(&mut requests).await;

    let starts = journal
        .reported_states()
        .into_iter()
        .filter(|state| *state == ServiceState::StartPending)
        .count();
    assert_eq!(starts, 1);
    assert_eq!(
        journal
            .events()
            .iter()
            .filter(|event| **event == LifecycleEvent::Starting)
            .count(),
        1
    );
}
