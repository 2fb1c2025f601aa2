use crate::accountdb::{
    errors::AccountError,
    types::{Account, Role},
};
use crate::storage::GENERIC_DATA_STORE;

use super::postgres::*;
use super::sqlite::*;

pub(crate) struct AccountStore;

impl AccountStore {
    /// Create the accounts table if it does not exist
    pub(crate) async fn init() -> Result<(), AccountError> {
        let store = &*GENERIC_DATA_STORE;
        tracing::debug!(backend = store.backend(), "Preparing accounts table");

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => create_tables_sqlite(pool).await,
            (_, Some(pool)) => create_tables_postgres(pool).await,
            _ => Err(AccountError::Storage("Unsupported database type".to_string())),
        }
    }

    pub(crate) async fn get_all_accounts() -> Result<Vec<Account>, AccountError> {
        let store = &*GENERIC_DATA_STORE;

        if let Some(pool) = store.as_sqlite() {
            get_all_accounts_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            get_all_accounts_postgres(pool).await
        } else {
            Err(AccountError::Storage("Unsupported database type".to_string()))
        }
    }

    #[tracing::instrument(fields(username = %username))]
    pub(crate) async fn get_account(username: &str) -> Result<Option<Account>, AccountError> {
        let store = &*GENERIC_DATA_STORE;

        let result = if let Some(pool) = store.as_sqlite() {
            get_account_sqlite(pool, username).await
        } else if let Some(pool) = store.as_postgres() {
            get_account_postgres(pool, username).await
        } else {
            Err(AccountError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(found) => tracing::debug!(found = found.is_some(), "Account lookup completed"),
            Err(e) => tracing::error!(error = %e, "Account lookup failed"),
        }

        result
    }

    /// Insert a new account. A taken username yields `AccountError::Duplicate`.
    #[tracing::instrument(skip(account), fields(username = %account.username, role = %account.role))]
    pub(crate) async fn insert_account(account: Account) -> Result<Account, AccountError> {
        let store = &*GENERIC_DATA_STORE;

        let result = if let Some(pool) = store.as_sqlite() {
            insert_account_sqlite(pool, account).await
        } else if let Some(pool) = store.as_postgres() {
            insert_account_postgres(pool, account).await
        } else {
            Err(AccountError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(account) => tracing::info!(
                sequence_number = account.sequence_number,
                "Account created"
            ),
            Err(AccountError::Duplicate(_)) => tracing::info!("Account already exists"),
            Err(e) => tracing::error!(error = %e, "Account insert failed"),
        }

        result
    }

    #[tracing::instrument(skip(password_hash), fields(username = %username))]
    pub(crate) async fn update_password_hash(
        username: &str,
        password_hash: &str,
    ) -> Result<Account, AccountError> {
        let store = &*GENERIC_DATA_STORE;

        if let Some(pool) = store.as_sqlite() {
            update_password_hash_sqlite(pool, username, password_hash).await
        } else if let Some(pool) = store.as_postgres() {
            update_password_hash_postgres(pool, username, password_hash).await
        } else {
            Err(AccountError::Storage("Unsupported database type".to_string()))
        }
    }

    #[tracing::instrument(fields(username = %username, role = %role))]
    pub(crate) async fn update_role(username: &str, role: Role) -> Result<Account, AccountError> {
        let store = &*GENERIC_DATA_STORE;

        if let Some(pool) = store.as_sqlite() {
            update_role_sqlite(pool, username, role).await
        } else if let Some(pool) = store.as_postgres() {
            update_role_postgres(pool, username, role).await
        } else {
            Err(AccountError::Storage("Unsupported database type".to_string()))
        }
    }

    pub(crate) async fn delete_account(username: &str) -> Result<(), AccountError> {
        let store = &*GENERIC_DATA_STORE;

        if let Some(pool) = store.as_sqlite() {
            delete_account_sqlite(pool, username).await
        } else if let Some(pool) = store.as_postgres() {
            delete_account_postgres(pool, username).await
        } else {
            Err(AccountError::Storage("Unsupported database type".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_environment;
    use chrono::Utc;
    use serial_test::serial;

    fn create_test_account(suffix: &str, role: Role) -> Account {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Account::new(
            format!("store-{suffix}-{timestamp}"),
            "pbkdf2-sha256$1$c2FsdA$aGFzaA".to_string(),
            role,
        )
    }

    #[tokio::test]
    #[serial]
    async fn test_accountstore_init_is_idempotent() {
        init_test_environment().await;

        assert!(AccountStore::init().await.is_ok());
        assert!(AccountStore::init().await.is_ok());
    }

    #[tokio::test]
    #[serial]
    async fn test_insert_and_get_account() {
        init_test_environment().await;
        let account = create_test_account("insert", Role::User);

        let created = AccountStore::insert_account(account.clone())
            .await
            .expect("insert should succeed");
        assert_eq!(created.username, account.username);
        assert_eq!(created.role, Role::User);
        assert!(created.sequence_number.is_some());

        let fetched = AccountStore::get_account(&account.username)
            .await
            .expect("lookup should succeed")
            .expect("account should exist");
        assert_eq!(fetched.password_hash, account.password_hash);

        AccountStore::delete_account(&account.username).await.unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn test_get_unknown_account_is_none() {
        init_test_environment().await;

        let result = AccountStore::get_account("store-nobody-registered").await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    #[serial]
    async fn test_duplicate_username_is_rejected() {
        init_test_environment().await;
        let account = create_test_account("dup", Role::User);

        AccountStore::insert_account(account.clone()).await.unwrap();

        // Same username with a different role and hash
        let mut second = account.clone();
        second.role = Role::Admin;
        second.password_hash = "other".to_string();
        let result = AccountStore::insert_account(second).await;
        assert!(matches!(result, Err(AccountError::Duplicate(ref u)) if *u == account.username));

        // The original record is untouched
        let stored = AccountStore::get_account(&account.username)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.role, Role::User);

        AccountStore::delete_account(&account.username).await.unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn test_update_role_and_password() {
        init_test_environment().await;
        let account = create_test_account("update", Role::User);
        AccountStore::insert_account(account.clone()).await.unwrap();

        let updated = AccountStore::update_role(&account.username, Role::Admin)
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Admin);

        let updated = AccountStore::update_password_hash(&account.username, "new-hash")
            .await
            .unwrap();
        assert_eq!(updated.password_hash, "new-hash");
        assert!(updated.updated_at >= updated.created_at);

        AccountStore::delete_account(&account.username).await.unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn test_update_unknown_account_is_not_found() {
        init_test_environment().await;

        let result = AccountStore::update_role("store-missing", Role::Admin).await;
        assert!(matches!(result, Err(AccountError::NotFound)));

        let result = AccountStore::update_password_hash("store-missing", "x").await;
        assert!(matches!(result, Err(AccountError::NotFound)));
    }

    #[tokio::test]
    #[serial]
    async fn test_get_all_accounts_is_ordered() {
        init_test_environment().await;
        let first = create_test_account("list-a", Role::User);
        let second = create_test_account("list-b", Role::Admin);
        AccountStore::insert_account(first.clone()).await.unwrap();
        AccountStore::insert_account(second.clone()).await.unwrap();

        let all = AccountStore::get_all_accounts().await.unwrap();
        let pos_a = all.iter().position(|a| a.username == first.username).unwrap();
        let pos_b = all.iter().position(|a| a.username == second.username).unwrap();
        assert!(pos_a < pos_b);

        AccountStore::delete_account(&first.username).await.unwrap();
        AccountStore::delete_account(&second.username).await.unwrap();
    }
}
