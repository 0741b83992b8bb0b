//! HTTP surface served while the service runs.
//!
//! The router answers `GET /` with a fixed greeting. Two middleware layers
//! wrap it: one resolves the caller's address from proxy headers or the
//! peer socket, the other records one log line per request.

mod client_ip;
mod errors;
mod listener;
mod router;

pub use self::client_ip::ClientIp;
pub use self::errors::ListenerError;
pub use self::listener::{HttpListener, ListenerHandle};
pub use self::router::{GREETING, router};

const HTTP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::http");
