use http::header::{CONTENT_TYPE, HeaderMap};
use http::Method;
use subtle::ConstantTimeEq;

use crate::session::errors::SessionError;
use crate::session::types::{CsrfHeaderVerified, CsrfToken};

const CSRF_HEADER: &str = "x-csrf-token";

/// Compare a submitted token (header or form field) with the session's token in constant time.
pub fn verify_csrf_token(expected: &CsrfToken, submitted: &str) -> bool {
    expected
        .as_str()
        .as_bytes()
        .ct_eq(submitted.as_bytes())
        .into()
}

fn is_state_changing(method: &Method) -> bool {
    method == Method::POST
        || method == Method::PUT
        || method == Method::DELETE
        || method == Method::PATCH
}

/// CSRF check for a request that carries a live session.
///
/// Safe methods pass. State-changing methods need a matching `X-CSRF-Token`
/// header, or a form body whose token field the handler verifies.
pub(crate) fn check_csrf(
    headers: &HeaderMap,
    method: &Method,
    expected: &CsrfToken,
) -> Result<CsrfHeaderVerified, SessionError> {
    if !is_state_changing(method) {
        return Ok(CsrfHeaderVerified(false));
    }

    if let Some(header_value) = headers.get(CSRF_HEADER) {
        let submitted = header_value
            .to_str()
            .map_err(|_| SessionError::CsrfToken("Invalid CSRF token header".to_string()))?;
        if !verify_csrf_token(expected, submitted) {
            tracing::debug!("CSRF token mismatch");
            return Err(SessionError::CsrfToken("CSRF token mismatch".to_string()));
        }
        return Ok(CsrfHeaderVerified(true));
    }

    if is_form_content(headers) {
        tracing::debug!("No CSRF header; deferring to form token check");
        return Ok(CsrfHeaderVerified(false));
    }

    tracing::debug!("No CSRF token found");
    Err(SessionError::CsrfToken("No CSRF token found".to_string()))
}

fn is_form_content(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let ct = ct.to_ascii_lowercase();
            ct.starts_with("application/x-www-form-urlencoded")
                || ct.starts_with("multipart/form-data")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn token() -> CsrfToken {
        CsrfToken::new("expected-token".to_string())
    }

    #[test]
    fn test_verify_csrf_token() {
        assert!(verify_csrf_token(&token(), "expected-token"));
        assert!(!verify_csrf_token(&token(), "expected-tokem"));
        assert!(!verify_csrf_token(&token(), ""));
    }

    #[test]
    fn test_safe_methods_skip_the_check() {
        let headers = HeaderMap::new();
        for method in [Method::GET, Method::HEAD, Method::OPTIONS] {
            assert_eq!(
                check_csrf(&headers, &method, &token()).unwrap(),
                CsrfHeaderVerified(false)
            );
        }
    }

    #[test]
    fn test_matching_header_is_verified() {
        let mut headers = HeaderMap::new();
        headers.insert(CSRF_HEADER, HeaderValue::from_static("expected-token"));

        assert_eq!(
            check_csrf(&headers, &Method::POST, &token()).unwrap(),
            CsrfHeaderVerified(true)
        );
    }

    #[test]
    fn test_mismatched_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(CSRF_HEADER, HeaderValue::from_static("other"));

        assert!(matches!(
            check_csrf(&headers, &Method::DELETE, &token()),
            Err(SessionError::CsrfToken(_))
        ));
    }

    #[test]
    fn test_form_post_defers_to_handler() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );

        assert_eq!(
            check_csrf(&headers, &Method::POST, &token()).unwrap(),
            CsrfHeaderVerified(false)
        );
    }

    #[test]
    fn test_json_post_without_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        assert!(check_csrf(&headers, &Method::PUT, &token()).is_err());
        assert!(check_csrf(&HeaderMap::new(), &Method::PATCH, &token()).is_err());
    }
}
