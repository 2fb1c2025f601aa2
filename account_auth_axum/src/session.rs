use std::collections::BTreeSet;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Redirect, Response},
};
use http::{Method, StatusCode, request::Parts};
use subtle::ConstantTimeEq;

use account_auth::{
    AUTH_LOGIN_URL, CoordinationError, Identity, Role, SessionAuth, authenticate_request_core,
};

/// Response for a request that needs a session and has none.
///
/// GET requests are sent to the login page; everything else gets a bare 401.
pub struct AuthRedirect {
    method: Method,
}

impl AuthRedirect {
    pub(crate) fn new(method: Method) -> Self {
        Self { method }
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        if self.method == Method::GET {
            tracing::debug!("Redirecting to {}", AUTH_LOGIN_URL.as_str());
            Redirect::temporary(AUTH_LOGIN_URL.as_str()).into_response()
        } else {
            tracing::debug!("Unauthorized");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

/// Why an [`AuthUser`] could not be extracted.
pub enum AuthRejection {
    NoSession(AuthRedirect),
    /// Live session, but the CSRF token was missing or wrong.
    Csrf,
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::NoSession(redirect) => redirect.into_response(),
            AuthRejection::Csrf => (StatusCode::FORBIDDEN, "Invalid CSRF token").into_response(),
            AuthRejection::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// The authenticated caller, available as an Axum extractor.
///
/// Extraction looks up the session named by the cookie and, for POST, PUT,
/// DELETE and PATCH, checks the `x-csrf-token` header. A form submission
/// without the header is let through with `csrf_via_header_verified == false`
/// and the handler must compare the form's token with
/// [`account_auth::verify_csrf_token`].
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use account_auth_axum::AuthUser;
///
/// async fn dashboard(user: AuthUser) -> String {
///     format!("Hello, {}!", user.username)
/// }
///
/// let app: Router = Router::new().route("/dashboard", get(dashboard));
/// ```
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
    /// Roles captured when the session was established
    pub roles: BTreeSet<Role>,
    pub csrf_token: String,
    pub csrf_via_header_verified: bool,
}

impl AuthUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.username.clone(), self.roles.iter().copied())
    }
}

impl From<SessionAuth> for AuthUser {
    fn from(auth: SessionAuth) -> Self {
        AuthUser {
            username: auth.identity.username,
            roles: auth.identity.roles,
            csrf_token: auth.csrf_token.as_str().to_string(),
            csrf_via_header_verified: auth.csrf_via_header_verified.0,
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by the access policy middleware
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        match authenticate_request_core(&parts.method, &parts.headers).await {
            Ok(Some(auth)) => Ok(AuthUser::from(auth)),
            Ok(None) => Err(AuthRejection::NoSession(AuthRedirect::new(
                parts.method.clone(),
            ))),
            Err(CoordinationError::Forbidden) => Err(AuthRejection::Csrf),
            Err(e) => {
                tracing::error!("Failed to resolve session: {}", e);
                Err(AuthRejection::Internal)
            }
        }
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let result: Result<Self, Self::Rejection> =
            <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await;
        Ok(result.ok())
    }
}

/// Form-side CSRF check for handlers of state-changing requests.
///
/// Passes when the header was already verified during extraction; otherwise
/// the form's `csrf_token` field must match the session token.
pub(crate) fn verify_form_csrf(
    user: &AuthUser,
    submitted: Option<&str>,
) -> Result<(), (StatusCode, String)> {
    if user.csrf_via_header_verified {
        return Ok(());
    }

    match submitted {
        Some(token) if bool::from(token.as_bytes().ct_eq(user.csrf_token.as_bytes())) => {
            tracing::trace!("CSRF token via form field verified");
            Ok(())
        }
        Some(_) => {
            tracing::warn!(username = %user.username, "CSRF token mismatch in form");
            Err((StatusCode::FORBIDDEN, "Invalid CSRF token".to_string()))
        }
        None => {
            tracing::warn!(username = %user.username, "CSRF token missing from form");
            Err((StatusCode::FORBIDDEN, "Missing CSRF token".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::LOCATION;

    #[test]
    fn test_auth_redirect_get_redirects_to_login() {
        let response = AuthRedirect::new(Method::GET).into_response();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            AUTH_LOGIN_URL.as_str()
        );
    }

    #[test]
    fn test_auth_redirect_other_methods_are_401() {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            let response = AuthRedirect::new(method).into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert!(response.headers().get(LOCATION).is_none());
        }
    }

    #[test]
    fn test_csrf_rejection_is_403() {
        assert_eq!(
            AuthRejection::Csrf.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    fn form_user(csrf_via_header_verified: bool) -> AuthUser {
        AuthUser {
            username: "junwoo".to_string(),
            roles: [Role::User].into_iter().collect(),
            csrf_token: "session-token".to_string(),
            csrf_via_header_verified,
        }
    }

    #[test]
    fn test_verify_form_csrf() {
        assert!(verify_form_csrf(&form_user(true), None).is_ok());
        assert!(verify_form_csrf(&form_user(false), Some("session-token")).is_ok());

        let (status, _) = verify_form_csrf(&form_user(false), Some("other")).unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = verify_form_csrf(&form_user(false), None).unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_auth_user_identity() {
        let user = AuthUser {
            username: "minji".to_string(),
            roles: [Role::Admin].into_iter().collect(),
            csrf_token: "token".to_string(),
            csrf_via_header_verified: false,
        };

        assert!(user.has_role(Role::Admin));
        assert!(!user.has_role(Role::User));
        assert_eq!(user.identity(), Identity::new("minji", [Role::Admin]));
    }
}
