// Configuration error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

impl From<ConfigError> for podium_core::Error {
    fn from(error: ConfigError) -> Self {
        podium_core::Error::Config(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
