//! Account database connection configuration

use std::{env, str::FromStr, sync::LazyLock};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::storage::errors::StorageError;

use super::types::{DataStore, PostgresDataStore, SqliteDataStore};

const DEFAULT_STORE_TYPE: &str = "sqlite";
const DEFAULT_STORE_URL: &str = "sqlite::memory:";
const DEFAULT_TABLE_PREFIX: &str = "aa_";

static GENERIC_DATA_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    setting_or(env::var("GENERIC_DATA_STORE_TYPE").ok(), DEFAULT_STORE_TYPE)
});

static GENERIC_DATA_STORE_URL: LazyLock<String> = LazyLock::new(|| {
    setting_or(env::var("GENERIC_DATA_STORE_URL").ok(), DEFAULT_STORE_URL)
});

/// Process-wide account database handle.
///
/// The pools are internally synchronized, so the handle is shared without a
/// lock and queries from concurrent requests run in parallel. A misconfigured
/// store type or URL panics on first use.
pub(crate) static GENERIC_DATA_STORE: LazyLock<Box<dyn DataStore>> = LazyLock::new(|| {
    let store_type = GENERIC_DATA_STORE_TYPE.as_str();
    tracing::info!("Initializing data store with type: {}", store_type);

    match build_data_store(store_type, GENERIC_DATA_STORE_URL.as_str()) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("{}", e);
            panic!("{e}");
        }
    }
});

/// Table prefix from environment variable
pub(crate) static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| setting_or(env::var("DB_TABLE_PREFIX").ok(), DEFAULT_TABLE_PREFIX));

fn setting_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Build a lazily connecting pool. Must run inside a Tokio runtime.
fn build_data_store(store_type: &str, store_url: &str) -> Result<Box<dyn DataStore>, StorageError> {
    match store_type {
        "sqlite" => {
            let opts = SqliteConnectOptions::from_str(store_url)
                .map_err(|e| {
                    StorageError::Storage(format!("Failed to parse SQLite connection string: {e}"))
                })?
                .create_if_missing(true);

            let pool_options = if is_sqlite_in_memory(store_url) {
                // Every connection to ":memory:" opens a fresh database, so keep exactly one alive
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
            } else {
                SqlitePoolOptions::new()
            };

            Ok(Box::new(SqliteDataStore {
                pool: pool_options.connect_lazy_with(opts),
            }))
        }
        "postgres" => {
            let pool = sqlx::PgPool::connect_lazy(store_url).map_err(|e| {
                StorageError::Storage(format!("Failed to create Postgres pool: {e}"))
            })?;
            Ok(Box::new(PostgresDataStore { pool }))
        }
        t => Err(StorageError::Storage(format!(
            "Unsupported store type: {t}. Supported types are 'sqlite' and 'postgres'"
        ))),
    }
}

fn is_sqlite_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_sqlite_in_memory() {
        assert!(is_sqlite_in_memory("sqlite::memory:"));
        assert!(is_sqlite_in_memory("sqlite:file:accounts?mode=memory&cache=shared"));
        assert!(!is_sqlite_in_memory("sqlite:./data/accounts.db"));
    }

    #[test]
    fn test_settings_fall_back_to_defaults() {
        assert_eq!(setting_or(None, DEFAULT_STORE_TYPE), "sqlite");
        assert_eq!(setting_or(None, DEFAULT_STORE_URL), "sqlite::memory:");
        assert_eq!(setting_or(None, DEFAULT_TABLE_PREFIX), "aa_");
        assert_eq!(setting_or(Some("".to_string()), DEFAULT_TABLE_PREFIX), "aa_");
        assert_eq!(setting_or(Some("auth_".to_string()), DEFAULT_TABLE_PREFIX), "auth_");
    }

    #[tokio::test]
    async fn test_build_sqlite_store() {
        let store = build_data_store("sqlite", DEFAULT_STORE_URL).expect("sqlite store");
        assert_eq!(store.backend(), "sqlite");
        assert!(store.as_sqlite().is_some());
    }

    #[tokio::test]
    async fn test_build_postgres_store_is_lazy() {
        // No server is contacted until the first query
        let store = build_data_store("postgres", "postgres://user:pw@localhost:5432/accounts")
            .expect("postgres store");
        assert_eq!(store.backend(), "postgres");
    }

    #[tokio::test]
    async fn test_build_rejects_unsupported_type() {
        match build_data_store("mysql", DEFAULT_STORE_URL) {
            Err(StorageError::Storage(msg)) => {
                assert!(msg.contains("Unsupported store type: mysql"))
            }
            _ => panic!("expected an unsupported store type error"),
        }
    }

    #[tokio::test]
    async fn test_build_rejects_bad_sqlite_url() {
        assert!(matches!(
            build_data_store("sqlite", "sqlite:accounts.db?mode=bogus"),
            Err(StorageError::Storage(_))
        ));
    }
}
