// AdminStorage trait: where admin user records live

use crate::error::Result;
use crate::user::AdminUser;
use async_trait::async_trait;

/// Persistent store of [`AdminUser`] records, keyed by hashed user id.
#[async_trait]
pub trait AdminStorage: Send + Sync {
    /// Prepare the store (directory, table).
    async fn open(&self) -> Result<()>;

    /// Fetch the record for `user_id`.
    async fn load(&self, user_id: &str) -> Result<Option<AdminUser>>;

    /// Insert or replace a record.
    async fn save(&self, user: &AdminUser) -> Result<()>;

    /// Remove a record. Returns whether it existed.
    async fn delete(&self, user_id: &str) -> Result<bool>;

    /// Every record, unordered.
    async fn all(&self) -> Result<Vec<AdminUser>>;

    /// Whether any user has ever been registered. Once true, bootstrap
    /// credentials stop working.
    async fn is_initialized(&self) -> Result<bool> {
        Ok(!self.all().await?.is_empty())
    }
}
