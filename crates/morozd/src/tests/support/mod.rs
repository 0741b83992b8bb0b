//! Test harness utilities for the service host behavioural suites.

mod journal;
mod requests;
mod scenario_world;

pub use journal::{Journal, LifecycleEvent, RecordingObserver, RecordingReporter};
pub use requests::{parse_exit_reason, parse_requests, parse_states};
pub use scenario_world::{ControllerWorld, world};
