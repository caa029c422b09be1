// Connection handling module
// Serves one accepted TCP connection with the CORS-wrapped file handler

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::cors::Cors;
use crate::handler;
use crate::logger;

/// Handle a single connection in a spawned local task.
///
/// The task:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures the HTTP/1 connection (keep-alive only when enabled)
/// 3. Bounds the wait for each request head with the configured timeout
/// 4. Serves it with the file handler decorated by [`Cors`]
///
/// Writing a response is never bounded, so slow clients still receive whole
/// files. Failures stay inside the task; other connections are unaffected.
pub fn spawn_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::task::spawn_local(async move {
        serve_connection(stream, peer_addr, state).await;
    });
}

async fn serve_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    let io = TokioIo::new(stream);

    let performance = &state.config.performance;
    let header_timeout = (performance.header_read_timeout > 0)
        .then_some(Duration::from_secs(performance.header_read_timeout));

    let mut builder = http1::Builder::new();
    builder
        .keep_alive(performance.keep_alive)
        .timer(TokioTimer::new())
        .header_read_timeout(header_timeout);

    let handler_state = Arc::clone(&state);
    let service = Cors::new(service_fn(move |req: Request<Incoming>| {
        handler::handle_request(req, Arc::clone(&handler_state), Some(peer_addr))
    }));

    match builder.serve_connection(io, service).await {
        Ok(()) => {}
        // Client went away mid-exchange, nothing to report
        Err(err) if err.is_incomplete_message() || err.is_canceled() => {}
        Err(err) if err.is_timeout() => {
            logger::log_warning(&format!(
                "Connection from {peer_addr} sent no request within {} seconds",
                performance.header_read_timeout
            ));
        }
        Err(err) => logger::log_connection_error(&err),
    }
}
