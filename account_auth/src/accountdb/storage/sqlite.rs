use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::accountdb::{
    errors::AccountError,
    types::{Account, AccountRow, Role},
};

use super::config::{DB_TABLE_ACCOUNTS, map_insert_error};

pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), AccountError> {
    let table_name = DB_TABLE_ACCOUNTS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            sequence_number INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn get_all_accounts_sqlite(
    pool: &Pool<Sqlite>,
) -> Result<Vec<Account>, AccountError> {
    // In-memory databases start empty on every new pool
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_ACCOUNTS.as_str();

    sqlx::query_as::<_, AccountRow>(&format!(
        r#"
        SELECT * FROM {table_name} ORDER BY sequence_number ASC
        "#
    ))
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Account::try_from)
    .collect()
}

pub(super) async fn get_account_sqlite(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<Option<Account>, AccountError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_ACCOUNTS.as_str();

    sqlx::query_as::<_, AccountRow>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE username = ?
        "#
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?
    .map(Account::try_from)
    .transpose()
}

pub(super) async fn insert_account_sqlite(
    pool: &Pool<Sqlite>,
    account: Account,
) -> Result<Account, AccountError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_ACCOUNTS.as_str();

    // Plain INSERT: the UNIQUE constraint decides between concurrent registrations
    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (username, password_hash, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#
    ))
    .bind(&account.username)
    .bind(&account.password_hash)
    .bind(account.role.as_str())
    .bind(account.created_at)
    .bind(account.updated_at)
    .execute(pool)
    .await
    .map_err(|e| map_insert_error(e, &account.username))?;

    get_account_sqlite(pool, &account.username)
        .await?
        .ok_or(AccountError::NotFound)
}

pub(super) async fn update_password_hash_sqlite(
    pool: &Pool<Sqlite>,
    username: &str,
    password_hash: &str,
) -> Result<Account, AccountError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_ACCOUNTS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET password_hash = ?, updated_at = ? WHERE username = ?
        "#
    ))
    .bind(password_hash)
    .bind(Utc::now())
    .bind(username)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AccountError::NotFound);
    }

    get_account_sqlite(pool, username)
        .await?
        .ok_or(AccountError::NotFound)
}

pub(super) async fn update_role_sqlite(
    pool: &Pool<Sqlite>,
    username: &str,
    role: Role,
) -> Result<Account, AccountError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_ACCOUNTS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET role = ?, updated_at = ? WHERE username = ?
        "#
    ))
    .bind(role.as_str())
    .bind(Utc::now())
    .bind(username)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AccountError::NotFound);
    }

    get_account_sqlite(pool, username)
        .await?
        .ok_or(AccountError::NotFound)
}

pub(super) async fn delete_account_sqlite(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<(), AccountError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_ACCOUNTS.as_str();

    sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE username = ?
        "#
    ))
    .bind(username)
    .execute(pool)
    .await?;

    Ok(())
}
