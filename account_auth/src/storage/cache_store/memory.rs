use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use std::collections::HashMap;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, InMemoryCacheStore, cache_key};

impl InMemoryCacheStore {
    pub(crate) fn new() -> Self {
        tracing::info!("Creating new in-memory generic cache store");
        Self {
            entry: HashMap::new(),
        }
    }

    fn evict_expired(&mut self) {
        let now = Utc::now();
        self.entry.retain(|_, (_, expires_at)| *expires_at > now);
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let key = cache_key(prefix, key);
        let now = Utc::now();
        Ok(self
            .entry
            .get(&key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(value, _)| value.clone()))
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        self.entry.remove(&cache_key(prefix, key));
        Ok(())
    }

    async fn put_if_not_exists(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<bool, StorageError> {
        let expires_at = i64::try_from(ttl)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| StorageError::Storage(format!("TTL out of range: {ttl}s")))?;

        self.evict_expired();
        let key = cache_key(prefix, key);
        if self.entry.contains_key(&key) {
            return Ok(false);
        }
        self.entry.insert(key, (value, expires_at));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(value: &str) -> CacheData {
        CacheData {
            value: value.to_string(),
        }
    }

    #[test]
    fn test_cache_key_layout() {
        assert_eq!(
            cache_key("session", "user123"),
            "cache:session:user123"
        );
    }

    #[tokio::test]
    async fn test_put_and_get() {
        // Given an in-memory cache store
        let mut store = InMemoryCacheStore::new();

        // When putting a value with TTL
        let stored = store
            .put_if_not_exists("test", "key1", data("test value"), 60)
            .await
            .unwrap();
        assert!(stored);

        // Then it can be read back
        let retrieved = store.get("test", "key1").await.unwrap();
        assert_eq!(retrieved, Some(data("test value")));
    }

    #[tokio::test]
    async fn test_expired_entry_is_not_returned() {
        let mut store = InMemoryCacheStore::new();

        // A zero TTL expires immediately
        store
            .put_if_not_exists("test", "stale", data("old"), 0)
            .await
            .unwrap();

        assert_eq!(store.get("test", "stale").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove() {
        let mut store = InMemoryCacheStore::new();
        store
            .put_if_not_exists("test", "key3", data("value to remove"), 60)
            .await
            .unwrap();

        store.remove("test", "key3").await.unwrap();
        assert!(store.get("test", "key3").await.unwrap().is_none());

        // Removing again is still fine
        assert!(store.remove("test", "key3").await.is_ok());
    }

    #[tokio::test]
    async fn test_put_if_not_exists() {
        let mut store = InMemoryCacheStore::new();

        let first = store
            .put_if_not_exists("session", "id", data("first"), 60)
            .await
            .unwrap();
        let second = store
            .put_if_not_exists("session", "id", data("second"), 60)
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
        // The original value is never overwritten
        assert_eq!(
            store.get("session", "id").await.unwrap(),
            Some(data("first"))
        );
    }

    #[tokio::test]
    async fn test_put_if_not_exists_reuses_expired_key() {
        let mut store = InMemoryCacheStore::new();
        store
            .put_if_not_exists("session", "id", data("expired"), 0)
            .await
            .unwrap();

        let stored = store
            .put_if_not_exists("session", "id", data("fresh"), 60)
            .await
            .unwrap();

        assert!(stored);
        assert_eq!(
            store.get("session", "id").await.unwrap(),
            Some(data("fresh"))
        );
    }

    #[tokio::test]
    async fn test_prefix_isolation() {
        let mut store = InMemoryCacheStore::new();
        store
            .put_if_not_exists("prefix1", "same_key", data("one"), 60)
            .await
            .unwrap();
        store
            .put_if_not_exists("prefix2", "same_key", data("two"), 60)
            .await
            .unwrap();

        assert_eq!(
            store.get("prefix1", "same_key").await.unwrap(),
            Some(data("one"))
        );
        assert_eq!(
            store.get("prefix2", "same_key").await.unwrap(),
            Some(data("two"))
        );
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_is_rejected() {
        let mut store = InMemoryCacheStore::new();

        let result = store
            .put_if_not_exists("session", "id", data("forever"), usize::MAX)
            .await;

        assert!(matches!(result, Err(StorageError::Storage(_))));
        assert_eq!(store.get("session", "id").await.unwrap(), None);
    }
}
