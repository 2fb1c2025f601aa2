use std::sync::LazyLock;

const DEFAULT_COOKIE_NAME: &str = "__Host-SessionId";
const DEFAULT_MAX_AGE_SECS: u64 = 600;
/// One year.
const MAX_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

/// Name of the cookie carrying the session id.
///
/// The `__Host-` prefix requires Secure, Path=/ and no Domain, which is what
/// the session cookie is issued with.
pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    cookie_name_from(std::env::var("SESSION_COOKIE_NAME").ok().as_deref())
});

/// Session lifetime in seconds, used both for the cookie and the stored record.
pub(crate) static SESSION_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    max_age_from(std::env::var("SESSION_COOKIE_MAX_AGE").ok().as_deref())
});

fn cookie_name_from(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_COOKIE_NAME)
        .to_string()
}

/// Zero, unparsable and over-one-year values fall back to the default.
fn max_age_from(value: Option<&str>) -> u64 {
    let Some(raw) = value else {
        return DEFAULT_MAX_AGE_SECS;
    };

    match raw.trim().parse::<u64>() {
        Ok(secs) if (1..=MAX_MAX_AGE_SECS).contains(&secs) => secs,
        _ => {
            tracing::warn!(
                "SESSION_COOKIE_MAX_AGE={} is not between 1 and {}; using {}",
                raw,
                MAX_MAX_AGE_SECS,
                DEFAULT_MAX_AGE_SECS
            );
            DEFAULT_MAX_AGE_SECS
        }
    }
}
