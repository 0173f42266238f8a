// Redis-backed cache

use crate::error::Result;
use crate::traits::CacheStore;
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;

/// [`CacheStore`] over a shared Redis connection.
pub struct RedisCache {
    conn: ConnectionManager,
    /// Prefix applied to every key, keeps the instance out of other tenants.
    prefix: String,
}

impl RedisCache {
    /// Connect to `url` (for example `redis://127.0.0.1/`).
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            prefix: prefix.into(),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.get(self.key(key)).await?)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(ttl) => {
                let _: () = conn.set_ex(self.key(key), value, ttl.as_secs()).await?;
            }
            None => {
                let _: () = conn.set(self.key(key), value).await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(self.key(key)).await?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        Ok(conn.exists(self.key(key)).await?)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let mut conn = self.conn.clone();
        let secs: i64 = conn.ttl(self.key(key)).await?;
        // Redis answers -2 for missing keys and -1 for unbounded ones.
        if secs < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(secs as u64)))
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn.clone();
        Ok(conn.expire(self.key(key), ttl.as_secs() as i64).await?)
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys(format!("{}*", self.prefix)).await?;
        if !keys.is_empty() {
            let _: i64 = conn.del(keys).await?;
        }
        Ok(())
    }
}
