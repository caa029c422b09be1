//! Logger module
//!
//! Provides logging utilities for the file server including:
//! - Startup banner
//! - Optional access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Startup banner, the only line printed by default
///
/// Always goes to stdout, even when the access log is redirected to a file.
pub fn log_server_start(url: &str) {
    println!("Serving with CORS at {url}");
}

/// Extra startup details, only shown when access logging is on
pub fn log_server_details(addr: &SocketAddr, config: &Config) {
    if !config.logging.access_log {
        return;
    }
    write_info(&format!("[CONFIG] Bound to: {addr}"));
    write_info(&format!("[CONFIG] Serving directory: {}", config.server.root));
    write_info(&format!(
        "[CONFIG] Access log format: {}",
        config.logging.access_log_format
    ));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("[CONFIG] Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("[CONFIG] Error log: {path}"));
    }
}

pub fn log_server_stopped(addr: &SocketAddr) {
    write_info(&format!("[SHUTDOWN] Listener on {addr} closed"));
}

/// Client-side transport failures (resets, half-written responses)
pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
