//! Key-value cache with a Redis backend and an in-memory fallback.
//!
//! The cache is an optimisation only: reads that fail are logged and
//! treated as misses, so callers always fall through to the database.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod backend;
pub mod error;
pub mod memory;
pub mod redis_cache;

pub use backend::CacheBackend;
pub use error::CacheError;
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Namespace prepended to every key so several apps can share one Redis.
pub const KEY_NAMESPACE: &str = "confdesk:";

/// Shared cache handle. Cheap to clone.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn CacheBackend>,
}

impl Cache {
    /// Wrap an explicit backend.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// An in-memory cache, used in tests and when Redis is not configured.
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryCache::new()))
    }

    /// Connect to Redis when `redis_url` is set and reachable, otherwise
    /// fall back to the in-memory backend.
    pub async fn connect(redis_url: Option<&str>) -> Self {
        let Some(url) = redis_url.filter(|u| !u.trim().is_empty()) else {
            tracing::info!("REDIS_URL not set, using in-memory cache");
            return Self::memory();
        };

        match RedisCache::connect(url).await {
            Ok(redis) => {
                tracing::info!("Connected to Redis cache");
                Self::new(Arc::new(redis))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, falling back to in-memory cache");
                Self::memory()
            }
        }
    }

    /// Name of the active backend (`"redis"` or `"memory"`).
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn key(key: &str) -> String {
        format!("{KEY_NAMESPACE}{key}")
    }

    /// Fetch and deserialize a value. Errors and undecodable entries are misses.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(&Self::key(key)).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Serialize and store a value with a time-to-live.
    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(&Self::key(key), &raw, ttl).await
    }

    /// Remove a key. Failures are logged; stale entries expire on their own.
    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.backend.delete(&Self::key(key)).await {
            tracing::warn!(key, error = %e, "Cache invalidation failed");
        }
    }

    /// Remove every key starting with `prefix`.
    pub async fn invalidate_prefix(&self, prefix: &str) {
        if let Err(e) = self.backend.delete_prefix(&Self::key(prefix)).await {
            tracing::warn!(prefix, error = %e, "Cache prefix invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Overview {
        total: i64,
        label: String,
    }

    #[tokio::test]
    async fn connect_without_url_uses_memory() {
        let cache = Cache::connect(None).await;
        assert_eq!(cache.backend_name(), "memory");

        let cache = Cache::connect(Some("  ")).await;
        assert_eq!(cache.backend_name(), "memory");
    }

    #[tokio::test]
    async fn json_round_trip() {
        let cache = Cache::memory();
        let value = Overview {
            total: 42,
            label: "admin".into(),
        };

        cache
            .set_json("dashboard:admin", &value, Duration::from_secs(30))
            .await
            .unwrap();

        let back: Option<Overview> = cache.get_json("dashboard:admin").await;
        assert_eq!(back, Some(value));
    }

    #[tokio::test]
    async fn undecodable_entry_is_a_miss() {
        let backend = Arc::new(MemoryCache::new());
        backend
            .set("confdesk:broken", "not json", Duration::from_secs(30))
            .await
            .unwrap();
        let cache = Cache::new(backend);

        let value: Option<Overview> = cache.get_json("broken").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn invalidate_prefix_only_touches_matching_keys() {
        let cache = Cache::memory();
        let ttl = Duration::from_secs(30);
        cache.set_json("dashboard:admin", &1, ttl).await.unwrap();
        cache.set_json("dashboard:validator:7", &2, ttl).await.unwrap();
        cache.set_json("settings:public", &3, ttl).await.unwrap();

        cache.invalidate_prefix("dashboard:").await;

        assert_eq!(cache.get_json::<i32>("dashboard:admin").await, None);
        assert_eq!(cache.get_json::<i32>("dashboard:validator:7").await, None);
        assert_eq!(cache.get_json::<i32>("settings:public").await, Some(3));
    }
}
