// Configuration module entry point
// Loads the immutable startup configuration and the shared runtime state

mod state;
mod types;

use std::net::{IpAddr, SocketAddr};

use crate::error::ServerError;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Base name of the optional config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "cors_server";

impl Config {
    /// Load configuration from `cors_server.{toml,json,yaml,...}` if present
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// A missing file is not an error: every key has a default.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name(config_path).required(false))
            .build()?
            .try_deserialize()
    }

    /// Configuration built from defaults only
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.root", ".")?
            .set_default("logging.access_log", false)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", false)?
            .set_default("performance.header_read_timeout", 30)?
            .set_default("http.server_name", "cors_server")
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|e| ServerError::Address(format!("'{}': {e}", self.server.host)))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// URL printed in the startup banner
    ///
    /// Unspecified hosts are shown as `localhost` since that is what a browser
    /// on the same machine would use.
    pub fn banner_url(&self, port: u16) -> String {
        match self.server.host.parse::<IpAddr>() {
            Ok(ip) if ip.is_unspecified() || ip.is_loopback() => {
                format!("http://localhost:{port}")
            }
            Ok(IpAddr::V6(ip)) => format!("http://[{ip}]:{port}"),
            _ => format!("http://{}:{port}", self.server.host),
        }
    }
}
