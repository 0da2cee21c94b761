use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// Storage behind [`crate::Cache`]. Keys arrive already namespaced.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Delete every key beginning with `prefix`.
    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError>;

    /// Short backend name for logs and the health endpoint.
    fn name(&self) -> &'static str;
}
