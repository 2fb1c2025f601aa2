use async_trait::async_trait;
use redis::{self, AsyncCommands, aio::MultiplexedConnection};

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, RedisCacheStore, cache_key};

impl RedisCacheStore {
    async fn connection(&self) -> Result<MultiplexedConnection, StorageError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::debug!("Redis session store reachable");
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(cache_key(prefix, key)).await?;

        raw.map(|v| serde_json::from_str(&v).map_err(StorageError::from))
            .transpose()
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        let _: () = conn.del(cache_key(prefix, key)).await?;
        Ok(())
    }

    async fn put_if_not_exists(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<bool, StorageError> {
        let mut conn = self.connection().await?;
        let value = serde_json::to_string(&value)?;

        // SET NX EX in one command so the value never exists without its TTL
        let reply: Option<String> = redis::cmd("SET")
            .arg(cache_key(prefix, key))
            .arg(&value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.max(1))
            .query_async(&mut conn)
            .await?;

        Ok(reply.is_some())
    }
}
