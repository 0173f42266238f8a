// CacheStore trait: the seam every cache backend implements

use crate::error::{CacheError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// String-keyed cache of serialized values.
///
/// Payloads are stored as strings; the typed helpers on the trait serialize
/// through JSON. A `get` of a missing or expired key is `Ok(None)`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the raw payload for `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, with an optional time to live.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()>;

    /// Remove `key`. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Whether `key` is present and unexpired.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remaining time to live for `key`, `None` when absent or unbounded.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>>;

    /// Reset the time to live for an existing key. Returns whether it existed.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Drop everything.
    async fn clear(&self) -> Result<()>;

    /// Fetch and deserialize.
    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(payload) => serde_json::from_str(&payload)
                .map(Some)
                .map_err(|e| CacheError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// Serialize and store.
    async fn set_json<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let payload =
            serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.set(key, payload, ttl).await
    }
}
