use sqlx::{PgPool, SqlitePool};

/// SQLite-backed account database.
#[derive(Clone, Debug)]
pub(crate) struct SqliteDataStore {
    pub(super) pool: SqlitePool,
}

/// Postgres-backed account database.
#[derive(Clone, Debug)]
pub(crate) struct PostgresDataStore {
    pub(super) pool: PgPool,
}

/// A relational backend for the account table.
///
/// Exactly one accessor returns `Some`; callers branch on it to pick the
/// matching SQL dialect.
pub(crate) trait DataStore: Send + Sync {
    fn as_sqlite(&self) -> Option<&SqlitePool> {
        None
    }

    fn as_postgres(&self) -> Option<&PgPool> {
        None
    }

    /// Backend name for log lines.
    fn backend(&self) -> &'static str;
}

impl DataStore for SqliteDataStore {
    fn as_sqlite(&self) -> Option<&SqlitePool> {
        Some(&self.pool)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

impl DataStore for PostgresDataStore {
    fn as_postgres(&self) -> Option<&PgPool> {
        Some(&self.pool)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
