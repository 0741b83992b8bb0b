//! Structured reporting for service lifecycle events.

use std::sync::Arc;

use crate::controller::{ControlRequest, ControllerExit, ReportError, ServiceState};

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait LifecycleObserver: Send + Sync {
    /// Invoked once before the first status report.
    fn controller_starting(&self);

    /// Invoked after every state change.
    fn state_changed(&self, from: ServiceState, to: ServiceState);

    /// Invoked each time the periodic task runs; `count` starts at one.
    fn heartbeat(&self, count: u64);

    /// Invoked for control codes the service does not recognise.
    fn unexpected_control(&self, code: u32);

    /// Invoked for known commands that are not accepted in `state`.
    fn control_rejected(&self, request: ControlRequest, state: ServiceState);

    /// Invoked when the service manager refuses a status record.
    fn report_failed(&self, error: &ReportError);

    /// Invoked when every control request sender has gone away.
    fn control_channel_closed(&self);

    /// Invoked after the control loop returns.
    fn controller_stopped(&self, exit: &ControllerExit);
}

impl<T> LifecycleObserver for Arc<T>
where
    T: LifecycleObserver + ?Sized,
{
    fn controller_starting(&self) {
        (**self).controller_starting();
    }

    fn state_changed(&self, from: ServiceState, to: ServiceState) {
        (**self).state_changed(from, to);
    }

    fn heartbeat(&self, count: u64) {
        (**self).heartbeat(count);
    }

    fn unexpected_control(&self, code: u32) {
        (**self).unexpected_control(code);
    }

    fn control_rejected(&self, request: ControlRequest, state: ServiceState) {
        (**self).control_rejected(request, state);
    }

    fn report_failed(&self, error: &ReportError) {
        (**self).report_failed(error);
    }

    fn control_channel_closed(&self) {
        (**self).control_channel_closed();
    }

    fn controller_stopped(&self, exit: &ControllerExit) {
        (**self).controller_stopped(exit);
    }
}

/// Default observer that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleObserver;

impl StructuredLifecycleObserver {
    /// Builds a new observer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LifecycleObserver for StructuredLifecycleObserver {
    fn controller_starting(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "controller_starting",
            "service controller starting"
        );
    }

    fn state_changed(&self, from: ServiceState, to: ServiceState) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "state_changed",
            from = %from,
            to = %to,
            "service state changed"
        );
    }

    fn heartbeat(&self, count: u64) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "heartbeat",
            count,
            "periodic task ran"
        );
    }

    fn unexpected_control(&self, code: u32) {
        tracing::warn!(
            target: LIFECYCLE_TARGET,
            event = "unexpected_control",
            code,
            "unexpected control code"
        );
    }

    fn control_rejected(&self, request: ControlRequest, state: ServiceState) {
        tracing::warn!(
            target: LIFECYCLE_TARGET,
            event = "control_rejected",
            request = request.name(),
            state = %state,
            "control request not accepted in current state"
        );
    }

    fn report_failed(&self, error: &ReportError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "report_failed",
            error = %error,
            "failed to report service status"
        );
    }

    fn control_channel_closed(&self) {
        tracing::warn!(
            target: LIFECYCLE_TARGET,
            event = "control_channel_closed",
            "control channel closed; treating as shutdown"
        );
    }

    fn controller_stopped(&self, exit: &ControllerExit) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "controller_stopped",
            reason = ?exit.reason,
            exit_code = exit.exit_code(),
            "service controller stopped"
        );
    }
}
