//! Central configuration for the account_auth crate

use std::sync::LazyLock;

/// Where anonymous users are sent when a protected page is requested with GET.
///
/// Default: "/login"
pub static AUTH_LOGIN_URL: LazyLock<String> =
    LazyLock::new(|| local_path_or(std::env::var("AUTH_LOGIN_URL").ok(), "/login"));

/// Where a browser is sent after a successful form login.
///
/// Default: "/"
pub static AUTH_REDIRECT_USER: LazyLock<String> =
    LazyLock::new(|| local_path_or(std::env::var("AUTH_REDIRECT_USER").ok(), "/"));

/// Redirect targets must be same-site paths; anything else uses `default`.
fn local_path_or(value: Option<String>, default: &str) -> String {
    match value.map(|v| v.trim().to_string()) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        Some(other) => {
            tracing::warn!("Ignoring redirect target {:?}; using {}", other, default);
            default.to_string()
        }
        None => default.to_string(),
    }
}
