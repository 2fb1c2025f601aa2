use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

const CACHE_PREFIX: &str = "cache";

/// Key layout shared by every backend: `cache:{prefix}:{key}`.
pub(super) fn cache_key(prefix: &str, key: &str) -> String {
    format!("{CACHE_PREFIX}:{prefix}:{key}")
}

pub(crate) struct InMemoryCacheStore {
    pub(super) entry: HashMap<String, (CacheData, DateTime<Utc>)>,
}

pub(crate) struct RedisCacheStore {
    pub(super) client: redis::Client,
}

/// Key/value store for short-lived records such as sessions.
///
/// Reads take `&self` and writes `&mut self` so the process-wide handle can
/// sit behind a `RwLock`: lookups run concurrently, writes are serialized.
#[async_trait]
pub(crate) trait CacheStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Get a value from the store. Expired values are never returned.
    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError>;

    /// Remove a value from the store. Removing a missing key is not an error.
    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError>;

    /// Put a value only if the key is free (atomic check-and-set).
    /// Returns true if the value was stored, false if the key was taken.
    async fn put_if_not_exists(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<bool, StorageError>;
}
