use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::header::HeaderValue;

use account_auth::{
    AccessDecision, AuthState, Requirement, access_policy, authorize_request_core,
};

use super::config::AUTH_RESPOND_WITH_X_CSRF_TOKEN;
use super::session::{AuthRedirect, AuthUser};

fn add_csrf_header(mut response: Response, csrf_token: &str) -> Response {
    if !*AUTH_RESPOND_WITH_X_CSRF_TOKEN {
        return response;
    }

    if let Ok(header_value) = HeaderValue::from_str(csrf_token) {
        response.headers_mut().insert("x-csrf-token", header_value);
    } else {
        tracing::error!("Failed to create CSRF header value from token");
    }
    response
}

/// Apply the configured access policy to every request passing through.
///
/// Allowed requests reach the handler; requests on protected paths also get
/// an [`AuthUser`] in their extensions. Anonymous requests for protected
/// paths are redirected to the login page (GET) or answered 401. Requests
/// that are authenticated but lack the role, or fail the CSRF check, get 403.
///
/// ```no_run
/// use axum::{Router, middleware, routing::get};
/// use account_auth_axum::{auth_router, enforce_access_policy};
///
/// let app: Router = Router::new()
///     .route("/dashboard", get(|| async { "dashboard" }))
///     .merge(auth_router())
///     .layer(middleware::from_fn(enforce_access_policy));
/// ```
pub async fn enforce_access_policy(mut req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let authorization = match authorize_request_core(&method, &path, req.headers()).await {
        Ok(authorization) => authorization,
        Err(e) => {
            tracing::error!("Access check failed: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    match authorization.decision {
        AccessDecision::Allow => {
            let csrf_token = authorization.csrf_token;

            // Public paths skip the CSRF check, so the handler extracts AuthUser itself
            if let (AuthState::Authenticated(identity), Some(token)) =
                (&authorization.auth_state, &csrf_token)
            {
                if access_policy().requirement_for(&path) != Requirement::Public {
                    req.extensions_mut().insert(AuthUser {
                        username: identity.username.clone(),
                        roles: identity.roles.clone(),
                        csrf_token: token.as_str().to_string(),
                        csrf_via_header_verified: authorization.csrf_via_header_verified.0,
                    });
                }
            }

            let response = next.run(req).await;
            match csrf_token {
                Some(token) => add_csrf_header(response, token.as_str()),
                None => response,
            }
        }
        AccessDecision::Unauthenticated => AuthRedirect::new(method).into_response(),
        AccessDecision::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
    }
}
