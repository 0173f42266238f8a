// Admin auth error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Session error: {0}")]
    Session(#[from] podium_session::SessionError),

    #[error("Auth storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "sqlite")]
    #[error("Auth storage database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Auth record encoding error: {0}")]
    Encoding(String),

    #[error("Password hash error: {0}")]
    PasswordHash(String),

    #[error("Password verify error: {0}")]
    PasswordVerify(String),

    #[error("Unknown user: {0}")]
    UserNotFound(String),

    #[error("User already registered: {0}")]
    DuplicateUser(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Login is stopped for user {0}")]
    LoginStopped(String),

    #[error("Administrative rights lapsed for user {0}")]
    RightsLapsed(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
