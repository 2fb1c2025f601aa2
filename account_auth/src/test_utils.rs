//! Shared test setup and helpers.
//!
//! Compiled for this crate's own tests and, through the `test-utils`
//! feature, for downstream test suites. Never enable the feature in a
//! production build: it can create authenticated sessions without a password.

use std::sync::Once;

use chrono::Utc;
use http::{HeaderMap, HeaderValue, header::COOKIE};

use crate::accountdb::Role;
use crate::session::{Identity, SESSION_COOKIE_NAME, SessionError, establish_unverified};

/// Load `.env_test` (falling back to `.env`) once, then initialize the stores.
///
/// Safe to call from every test.
pub async fn init_test_environment() {
    load_test_env();

    if let Err(e) = crate::init().await {
        eprintln!("Warning: Failed to initialize stores: {e}");
    }
}

/// Load `.env_test` once. For synchronous tests that read configuration
/// statics without touching the stores.
pub fn load_test_env() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });
}

/// Create an authenticated session for `username` with `roles`, skipping credential checks.
///
/// No account record is needed. Returns the session id to send as the cookie value.
pub async fn establish_test_session(
    username: &str,
    roles: impl IntoIterator<Item = Role>,
) -> Result<(String, Identity), SessionError> {
    establish_unverified(username, roles).await
}

/// Request headers carrying `session_id` in the session cookie.
pub fn cookie_request_headers(session_id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&session_cookie(session_id)) {
        headers.insert(COOKIE, value);
    }
    headers
}

/// `name=value` pair for the session cookie.
pub fn session_cookie(session_id: &str) -> String {
    format!("{}={}", *SESSION_COOKIE_NAME, session_id)
}

/// A username no other test has used in this process.
pub fn unique_username(prefix: &str) -> String {
    format!(
        "{prefix}-{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}
