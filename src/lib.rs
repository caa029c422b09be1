//! Static file server that adds permissive CORS headers to every response.
//!
//! The served directory, port and logging are described by [`config::Config`];
//! [`server::Server`] owns the listening socket and runs the accept loop, and
//! [`cors::Cors`] decorates the file handler in [`handler`].

pub mod config;
pub mod cors;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use error::ServerError;
