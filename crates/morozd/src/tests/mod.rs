//! Test suites for the Moroz service host.

mod controller_behaviour;
mod support;
