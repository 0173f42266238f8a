// Error types for the Podium framework

use crate::HttpStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Controller not found: {0}")]
    ControllerNotFound(String),

    #[error("Method {method} not found on controller {controller}")]
    MethodNotFound { controller: String, method: String },

    #[error("Hook binding error: {0}")]
    HookBinding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::RouteNotFound(_)
            | Error::ControllerNotFound(_)
            | Error::MethodNotFound { .. } => HttpStatus::NotFound.code(),
            Error::Deserialization(_) => HttpStatus::BadRequest.code(),
            _ => HttpStatus::InternalServerError.code(),
        }
    }

    /// Get the HttpStatus enum for this error
    pub fn http_status(&self) -> HttpStatus {
        HttpStatus::from_code(self.status_code()).unwrap_or(HttpStatus::InternalServerError)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
