// Application state module
// Immutable per-process state shared by every connection task

use std::path::{Path, PathBuf};

use super::types::Config;
use crate::error::ServerError;

/// Application state
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Canonical served directory; resolved paths must stay below it
    pub root: PathBuf,
}

impl AppState {
    /// Resolve the configured root and build the shared state
    pub fn new(config: Config) -> Result<Self, ServerError> {
        let root = Path::new(&config.server.root)
            .canonicalize()
            .map_err(|source| ServerError::Root {
                path: config.server.root.clone(),
                source,
            })?;

        if !root.is_dir() {
            return Err(ServerError::Root {
                path: config.server.root.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a directory",
                ),
            });
        }

        Ok(Self { config, root })
    }

    /// Whether per-request access logging is enabled
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::defaults().unwrap();
        config.server.root = dir.path().join(".").display().to_string();

        let state = AppState::new(config).unwrap();
        assert_eq!(state.root, dir.path().canonicalize().unwrap());
        assert!(!state.access_log());
    }

    #[test]
    fn test_missing_root_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::defaults().unwrap();
        config.server.root = dir.path().join("missing").display().to_string();

        let err = AppState::new(config).unwrap_err();
        assert!(matches!(err, ServerError::Root { .. }));
    }

    #[test]
    fn test_file_root_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        let mut config = Config::defaults().unwrap();
        config.server.root = file.display().to_string();

        assert!(AppState::new(config).is_err());
    }
}
