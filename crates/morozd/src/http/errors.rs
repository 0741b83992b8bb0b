//! Error types for the HTTP listener.

use std::io;

use thiserror::Error;

/// Errors surfaced while binding or running the HTTP listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The configured address could not be bound.
    #[error("failed to bind HTTP listener at {address}: {source}")]
    Bind {
        /// Address taken from configuration.
        address: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The bound socket did not report its local address.
    #[error("failed to read HTTP listener address: {source}")]
    LocalAddr {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The serving task panicked or was aborted.
    #[error("HTTP listener task did not complete")]
    TaskFailed,
}
