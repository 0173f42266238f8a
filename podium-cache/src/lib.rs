//! Caching for the Podium framework.
//!
//! [`CacheStore`] is the backend seam. [`MemoryCache`] is always available;
//! [`RedisCache`] lives behind the `redis` feature.

pub mod error;
pub mod memory_cache;
#[cfg(feature = "redis")]
pub mod redis_cache;
pub mod traits;

pub use error::{CacheError, Result};
pub use memory_cache::MemoryCache;
#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;
pub use traits::CacheStore;
