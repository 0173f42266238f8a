// Cache error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache serialization error: {0}")]
    Serialization(String),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for CacheError {
    fn from(error: redis::RedisError) -> Self {
        CacheError::Backend(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
