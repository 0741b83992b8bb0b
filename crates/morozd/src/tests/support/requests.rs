//! Parses the request and state lists used in feature files.

use crate::controller::{ControlRequest, ExitReason, ServiceState, StatusReport};

/// Parses a comma-separated request list such as `"pause, unknown 200"`.
///
/// Interrogation echoes `interrogated`, standing in for the status value the
/// service manager supplies.
pub fn parse_requests(
    list: &str,
    interrogated: StatusReport,
) -> Result<Vec<ControlRequest>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse_request(item, interrogated))
        .collect()
}

fn parse_request(item: &str, interrogated: StatusReport) -> Result<ControlRequest, String> {
    let mut words = item.split_whitespace();
    let request = match (words.next(), words.next()) {
        (Some("interrogate"), None) => ControlRequest::Interrogate {
            current: interrogated,
        },
        (Some("stop"), None) => ControlRequest::Stop,
        (Some("shutdown"), None) => ControlRequest::Shutdown,
        (Some("pause"), None) => ControlRequest::Pause,
        (Some("continue"), None) => ControlRequest::Continue,
        (Some("unknown"), Some(code)) => ControlRequest::Unknown(
            code.parse()
                .map_err(|error| format!("invalid control code '{code}': {error}"))?,
        ),
        _ => return Err(format!("unrecognised request '{item}'")),
    };
    Ok(request)
}

/// Parses a comma-separated list of state labels.
pub fn parse_states(list: &str) -> Result<Vec<ServiceState>, String> {
    list.split(',')
        .map(str::trim)
        .map(|label| match label {
            "start_pending" => Ok(ServiceState::StartPending),
            "running" => Ok(ServiceState::Running),
            "paused" => Ok(ServiceState::Paused),
            "stop_pending" => Ok(ServiceState::StopPending),
            "stopped" => Ok(ServiceState::Stopped),
            other => Err(format!("unrecognised state '{other}'")),
        })
        .collect()
}

/// Parses an exit reason label.
pub fn parse_exit_reason(label: &str) -> Result<ExitReason, String> {
    match label {
        "stop" => Ok(ExitReason::Stop),
        "shutdown" => Ok(ExitReason::Shutdown),
        "channel closure" => Ok(ExitReason::ControlChannelClosed),
        other => Err(format!("unrecognised exit reason '{other}'")),
    }
}
