//! Listener that serves the router on a bound TCP socket.

use std::net::SocketAddr;
use std::process;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{HTTP_TARGET, ListenerError, router};
use crate::process::FATAL_EXIT_CODE;

/// HTTP listener bound to its socket but not yet serving.
#[derive(Debug)]
pub struct HttpListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl HttpListener {
    /// Binds `address`; failure is reported before anything starts serving.
    pub async fn bind(address: &str) -> Result<Self, ListenerError> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| ListenerError::Bind {
                address: address.to_owned(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::LocalAddr { source })?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Address the socket is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Spawns the server onto the current runtime.
    ///
    /// A serve failure after bind is fatal: one error record is written and
    /// the process exits with [`FATAL_EXIT_CODE`].
    #[must_use]
    pub fn start(self) -> ListenerHandle {
        let (shutdown, mut stop) = watch::channel(false);
        let Self {
            listener,
            local_addr,
        } = self;
        let app = router().into_make_service_with_connect_info::<SocketAddr>();
        let task = tokio::spawn(async move {
            info!(
                target: HTTP_TARGET,
                address = %local_addr,
                "HTTP listener active"
            );
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop.wait_for(|stopping| *stopping).await;
                })
                .await;
            if let Err(source) = served {
                error!(
                    target: HTTP_TARGET,
                    address = %local_addr,
                    error = %source,
                    "HTTP listener failed"
                );
                process::exit(i32::from(FATAL_EXIT_CODE));
            }
            info!(
                target: HTTP_TARGET,
                address = %local_addr,
                "HTTP listener stopped"
            );
        });
        ListenerHandle {
            local_addr,
            shutdown,
            task,
        }
    }
}

/// Handle to the spawned server task.
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Address the server is listening on.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections; in-flight requests are allowed to finish.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Waits for the server task to finish.
    pub async fn join(self) -> Result<(), ListenerError> {
        self.task.await.map_err(|_| ListenerError::TaskFailed)
    }
}
