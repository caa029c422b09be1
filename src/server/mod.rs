// Server module entry point
// Binding, the accept loop, per-connection serving and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::AppState;
use crate::error::ServerError;
use crate::logger;

pub use listener::bind_listener;
pub use signal::shutdown_signal;

/// A bound, listening file server
///
/// Owning a `Server` means the socket is listening; [`Server::run_until`]
/// consumes it and the socket is closed when that returns.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<AppState>,
}

impl Server {
    /// Bind the address from the configuration
    pub fn bind(state: Arc<AppState>) -> Result<Self, ServerError> {
        let addr = state.config.socket_addr()?;
        Self::bind_addr(addr, state)
    }

    /// Bind an explicit address; port 0 picks a free port
    ///
    /// A port already in use or a privileged port yields
    /// [`ServerError::Bind`].
    pub fn bind_addr(addr: SocketAddr, state: Arc<AppState>) -> Result<Self, ServerError> {
        let listener = bind_listener(addr).map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            local_addr,
            state,
        })
    }

    /// Actual bound address (resolves port 0)
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run the accept loop until `shutdown` resolves
    ///
    /// Connections are served on `spawn_local` tasks, so this must be polled
    /// inside a `tokio::task::LocalSet`. In-flight connections are not awaited
    /// on shutdown.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            connection::spawn_connection(stream, peer_addr, Arc::clone(&self.state));
                        }
                        Err(e) => {
                            logger::log_error(&format!("Failed to accept connection: {e}"));
                        }
                    }
                }

                () = &mut shutdown => break,
            }
        }

        drop(self.listener);
        logger::log_server_stopped(&self.local_addr);
    }

    /// Run until SIGINT or SIGTERM
    pub async fn run(self) {
        self.run_until(shutdown_signal()).await;
    }
}
