// Session backend selection

use crate::error::{Result, SessionError};
use crate::file_session::FileSessionHandler;
use crate::handler::SessionHandler;
use std::path::PathBuf;
use std::sync::Arc;

/// Which storage backs the sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    File,
    Database,
    /// Recognized for compatibility but has no working handler; selecting it
    /// is an error at build time.
    Cache,
}

impl SessionBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "file" => Some(SessionBackend::File),
            "database" | "db" => Some(SessionBackend::Database),
            "cache" => Some(SessionBackend::Cache),
            _ => None,
        }
    }
}

/// Backend settings, resolved into a handler with
/// [`build_handler`](Self::build_handler).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub directory: PathBuf,
    pub database_path: PathBuf,
    pub lifetime_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::File,
            directory: PathBuf::from("sessions"),
            database_path: PathBuf::from("podium.db"),
            lifetime_secs: 1800,
        }
    }
}

impl SessionConfig {
    pub fn build_handler(&self) -> Result<Arc<dyn SessionHandler>> {
        match self.backend {
            SessionBackend::File => Ok(Arc::new(FileSessionHandler::new(&self.directory))),
            #[cfg(feature = "database")]
            SessionBackend::Database => Ok(Arc::new(
                crate::database_session::DatabaseSessionHandler::new(
                    &self.database_path,
                    self.lifetime_secs,
                )?,
            )),
            #[cfg(not(feature = "database"))]
            SessionBackend::Database => Err(SessionError::Unsupported(
                "database backend not compiled in".to_string(),
            )),
            SessionBackend::Cache => Err(SessionError::Unsupported(
                "cache-backed sessions are not implemented".to_string(),
            )),
        }
    }
}
