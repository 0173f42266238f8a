// SessionHandler trait: the storage seam every backend implements

use crate::error::Result;
use async_trait::async_trait;

/// Storage backend for serialized session payloads.
///
/// `read` of an unknown or expired session yields an empty payload rather
/// than an error, so a stale cookie simply starts a fresh session.
#[async_trait]
pub trait SessionHandler: Send + Sync {
    /// Prepare the backend (create the directory, the table, and so on).
    async fn open(&self) -> Result<()>;

    /// Release backend resources. A no-op for most backends.
    async fn close(&self) -> Result<()>;

    /// Read the payload stored for `id`, empty if absent or expired.
    async fn read(&self, id: &str) -> Result<String>;

    /// Persist `data` under `id`, refreshing its expiry.
    async fn write(&self, id: &str, data: &str) -> Result<()>;

    /// Remove the session stored under `id`.
    async fn destroy(&self, id: &str) -> Result<()>;

    /// Drop sessions older than `max_lifetime_secs`. Returns how many were
    /// collected.
    async fn gc(&self, max_lifetime_secs: u64) -> Result<usize>;
}

/// Fresh random session id, hex without separators.
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
