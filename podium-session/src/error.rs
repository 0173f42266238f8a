// Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session encoding error: {0}")]
    Encoding(String),

    #[cfg(feature = "database")]
    #[error("Session database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Unsupported session backend: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
