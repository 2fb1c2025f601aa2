use std::{env, sync::LazyLock};
use tokio::sync::RwLock;

use crate::storage::errors::StorageError;

use super::types::{CacheStore, InMemoryCacheStore, RedisCacheStore};

const DEFAULT_STORE_TYPE: &str = "memory";
const DEFAULT_STORE_URL: &str = "redis://localhost:6379";

pub(crate) static GENERIC_CACHE_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    setting_or(env::var("GENERIC_CACHE_STORE_TYPE").ok(), DEFAULT_STORE_TYPE)
});

pub(crate) static GENERIC_CACHE_STORE_URL: LazyLock<String> = LazyLock::new(|| {
    setting_or(env::var("GENERIC_CACHE_STORE_URL").ok(), DEFAULT_STORE_URL)
});

/// Process-wide session store. A misconfigured store type or URL panics on
/// first use.
pub(crate) static GENERIC_CACHE_STORE: LazyLock<RwLock<Box<dyn CacheStore>>> =
    LazyLock::new(|| {
        let store_type = GENERIC_CACHE_STORE_TYPE.as_str();
        tracing::info!("Initializing cache store with type: {}", store_type);

        match build_cache_store(store_type, GENERIC_CACHE_STORE_URL.as_str()) {
            Ok(store) => RwLock::new(store),
            Err(e) => {
                tracing::error!("{}", e);
                panic!("{e}");
            }
        }
    });

fn setting_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn build_cache_store(store_type: &str, store_url: &str) -> Result<Box<dyn CacheStore>, StorageError> {
    match store_type {
        "memory" => Ok(Box::new(InMemoryCacheStore::new())),
        "redis" => {
            let client = redis::Client::open(store_url).map_err(|e| {
                StorageError::Storage(format!("Failed to create Redis client: {e}"))
            })?;
            Ok(Box::new(RedisCacheStore { client }))
        }
        t => Err(StorageError::Storage(format!(
            "Unsupported cache store type: {t}. Supported types are 'memory' and 'redis'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_fall_back_to_defaults() {
        assert_eq!(setting_or(None, DEFAULT_STORE_TYPE), "memory");
        assert_eq!(setting_or(Some("  ".to_string()), DEFAULT_STORE_TYPE), "memory");
        assert_eq!(setting_or(Some("redis".to_string()), DEFAULT_STORE_TYPE), "redis");
        assert_eq!(setting_or(None, DEFAULT_STORE_URL), "redis://localhost:6379");
    }

    #[test]
    fn test_build_supported_stores() {
        assert!(build_cache_store("memory", DEFAULT_STORE_URL).is_ok());
        // Opening a client does not connect
        assert!(build_cache_store("redis", DEFAULT_STORE_URL).is_ok());
    }

    #[test]
    fn test_build_rejects_unsupported_type() {
        match build_cache_store("memcached", DEFAULT_STORE_URL) {
            Err(StorageError::Storage(msg)) => {
                assert!(msg.contains("Unsupported cache store type: memcached"))
            }
            _ => panic!("expected an unsupported store type error"),
        }
    }

    #[test]
    fn test_build_rejects_bad_redis_url() {
        assert!(matches!(
            build_cache_store("redis", "not a url"),
            Err(StorageError::Storage(_))
        ));
    }
}
