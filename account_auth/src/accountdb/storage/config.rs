use std::{env, sync::LazyLock};

use crate::storage::DB_TABLE_PREFIX;

/// Accounts table name
pub(super) static DB_TABLE_ACCOUNTS: LazyLock<String> = LazyLock::new(|| {
    env::var("DB_TABLE_ACCOUNTS").unwrap_or_else(|_| format!("{}{}", *DB_TABLE_PREFIX, "accounts"))
});

/// Map an insert failure, turning a UNIQUE violation on `username` into `Duplicate`.
pub(super) fn map_insert_error(err: sqlx::Error, username: &str) -> crate::accountdb::AccountError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            crate::accountdb::AccountError::Duplicate(username.to_string())
        }
        _ => crate::accountdb::AccountError::Storage(err.to_string()),
    }
}
