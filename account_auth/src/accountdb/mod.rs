mod credentials;
mod errors;
mod password;
mod storage;
mod types;

pub use credentials::{Verification, VerifiedAccount, verify_credentials};
pub use errors::AccountError;
pub(crate) use password::hash_password;
pub(crate) use storage::AccountStore;
pub use types::{Account, Role};

#[cfg(test)]
pub(crate) use password::hash_password_with_iterations;

pub(crate) async fn init() -> Result<(), AccountError> {
    AccountStore::init().await
}
