// In-process cache with lazy expiry

use crate::error::Result;
use crate::traits::CacheStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

/// Process-local [`CacheStore`].
///
/// Expired entries are dropped lazily on access; there is no sweeper task.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries (expired ones not yet collected included).
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                None => return Ok(None),
                Some(_) => {}
            }
        }
        self.entries.write().remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()> {
        let entry = Entry {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        match self.entries.write().remove(key) {
            Some(entry) => Ok(!entry.is_expired()),
            None => Ok(false),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let entries = self.entries.read();
        Ok(entries.get(key).and_then(|entry| {
            entry
                .expires_at
                .and_then(|at| at.checked_duration_since(Instant::now()))
        }))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new();
        cache.set("k", "v".to_string(), None).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
        assert!(cache.exists("k").await.unwrap());

        assert!(cache.delete("k").await.unwrap());
        assert!(!cache.delete("k").await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expiry() {
        let cache = MemoryCache::new();
        cache
            .set("k", "v".to_string(), Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert!(cache.exists("k").await.unwrap());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        // Lazy collection removed the entry on read.
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_expire_refreshes_ttl() {
        let cache = MemoryCache::new();
        cache.set("k", "v".to_string(), None).await.unwrap();
        assert_eq!(cache.ttl("k").await.unwrap(), None);

        assert!(cache.expire("k", Duration::from_secs(60)).await.unwrap());
        let remaining = cache.ttl("k").await.unwrap().unwrap();
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining > Duration::from_secs(50));

        assert!(!cache.expire("missing", Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_json_helpers() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Point {
            x: i32,
            y: i32,
        }

        let cache = MemoryCache::new();
        cache
            .set_json("p", &Point { x: 1, y: 2 }, None)
            .await
            .unwrap();
        let point: Option<Point> = cache.get_json("p").await.unwrap();
        assert_eq!(point, Some(Point { x: 1, y: 2 }));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = MemoryCache::new();
        cache.set("a", "1".to_string(), None).await.unwrap();
        cache.set("b", "2".to_string(), None).await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.is_empty());
    }
}
