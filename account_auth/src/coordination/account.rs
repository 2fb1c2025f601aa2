use crate::accountdb::{
    Account, AccountError, AccountStore, Role, Verification, hash_password, verify_credentials,
};
use crate::session::Identity;

use super::errors::CoordinationError;

const MAX_USERNAME_LEN: usize = 64;

/// Create an account with a salted password hash.
///
/// A username that is already taken yields `CoordinationError::Conflict`; the
/// existing account is left untouched.
#[tracing::instrument(skip(password), fields(username = %username, role = %role))]
pub async fn register_account(
    username: &str,
    password: &str,
    role: Role,
) -> Result<Account, CoordinationError> {
    validate_username(username)?;
    validate_password(password)?;

    let password_hash = hash_password(password)?;
    let account = AccountStore::insert_account(Account::new(
        username.to_string(),
        password_hash,
        role,
    ))
    .await?;

    tracing::info!("Account registered");
    Ok(account)
}

pub async fn get_account(username: &str) -> Result<Option<Account>, CoordinationError> {
    AccountStore::get_account(username)
        .await
        .map_err(|e| CoordinationError::Database(e.to_string()))
}

/// Change the caller's own password after re-checking the current one.
///
/// Existing sessions stay valid.
#[tracing::instrument(skip(identity, current_password, new_password), fields(username = %identity.username))]
pub async fn update_account_password(
    identity: &Identity,
    current_password: &str,
    new_password: &str,
) -> Result<(), CoordinationError> {
    validate_password(new_password)?;

    let verified = match verify_credentials(&identity.username, current_password).await? {
        Verification::Success(verified) => verified,
        Verification::Failure => return Err(CoordinationError::Authentication.log()),
    };

    let password_hash = hash_password(new_password)?;
    AccountStore::update_password_hash(verified.username(), &password_hash)
        .await
        .map_err(|e| match e {
            AccountError::NotFound => CoordinationError::ResourceNotFound {
                resource_type: "Account".to_string(),
                resource_id: identity.username.clone(),
            }
            .log(),
            e => e.into(),
        })?;

    tracing::info!("Password changed");
    Ok(())
}

fn validate_username(username: &str) -> Result<(), CoordinationError> {
    if username.is_empty() {
        return Err(CoordinationError::Validation("Username must not be empty".to_string()).log());
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(CoordinationError::Validation(format!(
            "Username must be at most {MAX_USERNAME_LEN} characters"
        ))
        .log());
    }
    if username
        .chars()
        .any(|c| c.is_control() || c.is_whitespace())
    {
        return Err(CoordinationError::Validation(
            "Username must not contain whitespace or control characters".to_string(),
        )
        .log());
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), CoordinationError> {
    if password.is_empty() {
        return Err(CoordinationError::Validation("Password must not be empty".to_string()).log());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{init_test_environment, unique_username};
    use serial_test::serial;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("junwoo").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("jun woo").is_err());
        assert!(validate_username("jun\twoo").is_err());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LEN)).is_ok());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("123").is_ok());
        assert!(validate_password("").is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_register_stores_hash_not_plaintext() {
        init_test_environment().await;
        let username = unique_username("register");

        let account = register_account(&username, "123", Role::User).await.unwrap();
        assert_eq!(account.username, username);
        assert_eq!(account.role, Role::User);
        assert_ne!(account.password_hash, "123");
        assert!(account.password_hash.starts_with("pbkdf2-sha256$"));

        let fetched = get_account(&username).await.unwrap().unwrap();
        assert_eq!(fetched.password_hash, account.password_hash);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    #[serial]
    async fn test_concurrent_registration_admits_exactly_one() {
        init_test_environment().await;
        let username = unique_username("race");

        let first = tokio::spawn({
            let username = username.clone();
            async move { register_account(&username, "first-pw", Role::User).await }
        });
        let second = tokio::spawn({
            let username = username.clone();
            async move { register_account(&username, "second-pw", Role::Admin).await }
        });
        let (first, second) = tokio::join!(first, second);
        let results = [first.unwrap(), second.unwrap()];

        let created: Vec<&Account> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(CoordinationError::Conflict(_))))
            .count();
        assert_eq!(created.len(), 1);
        assert_eq!(conflicts, 1);

        // The stored record is the winner's, untouched by the loser
        let stored = get_account(&username).await.unwrap().unwrap();
        assert_eq!(stored.role, created[0].role);
        assert_eq!(stored.password_hash, created[0].password_hash);
    }

    #[tokio::test]
    #[serial]
    async fn test_register_duplicate_is_conflict() {
        init_test_environment().await;
        let username = unique_username("dup");

        register_account(&username, "123", Role::User).await.unwrap();
        let result = register_account(&username, "456", Role::Admin).await;
        assert!(matches!(result, Err(CoordinationError::Conflict(_))));

        // The first registration still holds
        let verification = verify_credentials(&username, "123").await.unwrap();
        assert!(verification.is_success());
    }

    #[tokio::test]
    #[serial]
    async fn test_register_rejects_empty_fields() {
        init_test_environment().await;
        assert!(matches!(
            register_account("", "123", Role::User).await,
            Err(CoordinationError::Validation(_))
        ));
        assert!(matches!(
            register_account("someone", "", Role::User).await,
            Err(CoordinationError::Validation(_))
        ));
    }

    #[tokio::test]
    #[serial]
    async fn test_update_password_requires_current_password() {
        init_test_environment().await;
        let username = unique_username("passwd");
        register_account(&username, "123", Role::User).await.unwrap();
        let identity = Identity::new(username.clone(), [Role::User]);

        let result = update_account_password(&identity, "wrong", "456").await;
        assert!(matches!(result, Err(CoordinationError::Authentication)));
        assert!(verify_credentials(&username, "123").await.unwrap().is_success());

        update_account_password(&identity, "123", "456").await.unwrap();
        assert!(!verify_credentials(&username, "123").await.unwrap().is_success());
        assert!(verify_credentials(&username, "456").await.unwrap().is_success());
    }
}
