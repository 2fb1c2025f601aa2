//! account-auth: password login, sessions and role-based access decisions.
//!
//! The crate is framework independent. It verifies submitted credentials
//! against salted PBKDF2 hashes, issues sessions bound to the account's
//! username and role, and evaluates requests against an ordered per-path
//! rule table. HTTP integration lives in `account-auth-axum`.

mod accountdb;
mod config;
mod coordination;
mod policy;
mod session;
mod storage;
mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use accountdb::{Account, AccountError, Role, Verification, VerifiedAccount, verify_credentials};

pub use config::{AUTH_LOGIN_URL, AUTH_REDIRECT_USER};

pub use coordination::{
    Authorization, CoordinationError, LoginOutcome, SessionAuth, auth_state_from_headers,
    authenticate_request_core, authorize_request_core, delete_account_admin, get_account,
    list_accounts, login_core, register_account, update_account_password, update_account_role,
};

pub use policy::{
    AccessDecision, AccessPolicy, PathPattern, PolicyError, PolicyRule, Requirement,
    RoleHierarchy, evaluate,
};

pub use session::{
    AuthState, CsrfHeaderVerified, CsrfToken, Identity, SESSION_COOKIE_NAME, SessionError,
    establish, get_auth_state, invalidate, prepare_logout_response, verify_csrf_token,
};

pub use storage::StorageError;
pub use utils::UtilError;

/// The access policy in effect, as configured from the environment.
pub fn access_policy() -> &'static AccessPolicy {
    &policy::ACCESS_POLICY
}

/// Initialize the stores and the access policy
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    storage::init().await?;
    accountdb::init().await?;
    let _ = access_policy();
    Ok(())
}
