use std::sync::LazyLock;

/// Whether responses to authenticated requests carry the session's CSRF token
/// in an `x-csrf-token` header.
///
/// Default: true. Set `AUTH_RESPOND_WITH_X_CSRF_TOKEN=false` to disable.
pub static AUTH_RESPOND_WITH_X_CSRF_TOKEN: LazyLock<bool> = LazyLock::new(|| {
    parse_flag(
        std::env::var("AUTH_RESPOND_WITH_X_CSRF_TOKEN")
            .ok()
            .as_deref(),
    )
});

fn parse_flag(value: Option<&str>) -> bool {
    !matches!(value, Some(v) if v.eq_ignore_ascii_case("false"))
}
