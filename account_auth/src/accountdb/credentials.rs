//! Credential verification for password logins.

use super::errors::AccountError;
use super::password::{DUMMY_HASH, verify_password};
use super::storage::AccountStore;
use super::types::{Account, Role};

/// Proof that a username/password pair was checked against the stored account.
///
/// Only this module constructs it, and session establishment only accepts it,
/// so an authenticated session always follows a successful verification.
#[derive(Debug, Clone)]
pub struct VerifiedAccount {
    account: Account,
}

impl VerifiedAccount {
    pub fn username(&self) -> &str {
        &self.account.username
    }

    pub fn role(&self) -> Role {
        self.account.role
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    #[cfg(test)]
    pub(crate) fn assume_verified(account: Account) -> Self {
        Self { account }
    }
}

#[derive(Debug, Clone)]
pub enum Verification {
    Success(VerifiedAccount),
    /// Unknown username or wrong password. The two are deliberately not told apart.
    Failure,
}

impl Verification {
    pub fn is_success(&self) -> bool {
        matches!(self, Verification::Success(_))
    }
}

/// Check a submitted username/password pair against the account store.
///
/// Returns `Err` only when the store itself fails.
#[tracing::instrument(skip(password), fields(username = %username))]
pub async fn verify_credentials(
    username: &str,
    password: &str,
) -> Result<Verification, AccountError> {
    let account = AccountStore::get_account(username).await?;
    let verification = check_credentials(account, password);

    if verification.is_success() {
        tracing::info!("Credential verification succeeded");
    } else {
        tracing::info!("Credential verification failed");
    }

    Ok(verification)
}

pub(super) fn check_credentials(account: Option<Account>, password: &str) -> Verification {
    match account {
        Some(account) => match verify_password(password, &account.password_hash) {
            Ok(true) => Verification::Success(VerifiedAccount { account }),
            Ok(false) => Verification::Failure,
            Err(e) => {
                tracing::warn!(username = %account.username, "Stored credential unreadable: {}", e);
                Verification::Failure
            }
        },
        None => {
            // Same PBKDF2 work as a real account
            let _ = verify_password(password, &DUMMY_HASH);
            Verification::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accountdb::hash_password_with_iterations;
    use crate::test_utils::init_test_environment;
    use chrono::Utc;
    use proptest::prelude::*;
    use serial_test::serial;

    fn account_with_password(username: &str, password: &str, role: Role) -> Account {
        Account::new(
            username.to_string(),
            hash_password_with_iterations(password, 10).unwrap(),
            role,
        )
    }

    #[test]
    fn test_correct_password_succeeds() {
        let account = account_with_password("junwoo", "123", Role::User);

        match check_credentials(Some(account), "123") {
            Verification::Success(verified) => {
                assert_eq!(verified.username(), "junwoo");
                assert_eq!(verified.role(), Role::User);
            }
            Verification::Failure => panic!("expected success"),
        }
    }

    #[test]
    fn test_wrong_password_fails() {
        let account = account_with_password("junwoo", "123", Role::User);
        assert!(!check_credentials(Some(account), "!@#").is_success());
    }

    #[test]
    fn test_corrupt_stored_hash_fails_closed() {
        let mut account = account_with_password("junwoo", "123", Role::User);
        account.password_hash = "123".to_string();
        assert!(!check_credentials(Some(account), "123").is_success());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Without an account record no password verifies
        #[test]
        fn test_unregistered_username_always_fails(password in "\\PC{0,32}") {
            crate::test_utils::load_test_env();
            prop_assert!(!check_credentials(None, &password).is_success());
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_verify_credentials_against_store() {
        init_test_environment().await;
        let username = format!("verify-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
        AccountStore::insert_account(account_with_password(&username, "123", Role::User))
            .await
            .unwrap();

        assert!(verify_credentials(&username, "123").await.unwrap().is_success());
        assert!(!verify_credentials(&username, "!@#").await.unwrap().is_success());
        assert!(!verify_credentials("verify-nobody", "123").await.unwrap().is_success());

        AccountStore::delete_account(&username).await.unwrap();
    }
}
