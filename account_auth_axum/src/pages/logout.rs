use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::{TypedHeader, headers};
use serde::Deserialize;

use account_auth::{CoordinationError, prepare_logout_response};

use crate::error::IntoResponseError;

#[derive(Deserialize)]
pub(crate) struct RedirectQuery {
    redirect: Option<String>,
}

/// Only same-site paths are followed after logout.
fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}

/// End the session named by the cookie and expire the cookie.
///
/// With `?redirect=/path` the response redirects there; otherwise it is a
/// bare 200 carrying the expired cookie.
pub(crate) async fn logout(
    cookies: Option<TypedHeader<headers::Cookie>>,
    Query(params): Query<RedirectQuery>,
) -> Result<Response, (StatusCode, String)> {
    let headers = match cookies {
        Some(TypedHeader(cookies)) => prepare_logout_response(cookies)
            .await
            .map_err(CoordinationError::from)
            .into_response_error()?,
        None => HeaderMap::new(),
    };

    match params.redirect {
        Some(redirect_to) if is_local_path(&redirect_to) => {
            tracing::debug!("Redirecting to {}", redirect_to);
            Ok((headers, Redirect::to(&redirect_to)).into_response())
        }
        Some(redirect_to) => {
            tracing::warn!("Ignoring off-site logout redirect: {}", redirect_to);
            Ok((headers, StatusCode::OK).into_response())
        }
        None => Ok((headers, StatusCode::OK).into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_local_path() {
        assert!(is_local_path("/"));
        assert!(is_local_path("/dashboard?tab=1"));
        assert!(!is_local_path("//evil.example"));
        assert!(!is_local_path("https://evil.example/"));
        assert!(!is_local_path("/\\evil.example"));
        assert!(!is_local_path(""));
    }
}
