use axum::{
    extract::Form,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use account_auth::{AUTH_REDIRECT_USER, LoginOutcome, login_core};

use crate::error::IntoResponseError;
use crate::session::AuthUser;

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    username: String,
    password: String,
}

/// Signed-in visitors go straight on; others are told how to sign in.
pub(crate) async fn login_page(user: Option<AuthUser>) -> Response {
    match user {
        Some(user) => {
            tracing::debug!(username = %user.username, "Already signed in");
            Redirect::to(AUTH_REDIRECT_USER.as_str()).into_response()
        }
        None => (
            StatusCode::OK,
            "Sign in by submitting username and password as a form to POST /login",
        )
            .into_response(),
    }
}

/// Form login. Success sets the session cookie and redirects with 303.
pub(crate) async fn login(
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, String)> {
    match login_core(&headers, &form.username, &form.password)
        .await
        .into_response_error()?
    {
        LoginOutcome::Authenticated { headers, identity } => {
            tracing::debug!(username = %identity.username, "Redirecting to {}", AUTH_REDIRECT_USER.as_str());
            Ok((headers, Redirect::to(AUTH_REDIRECT_USER.as_str())).into_response())
        }
        LoginOutcome::Failed => {
            Ok((StatusCode::UNAUTHORIZED, "Authentication failed").into_response())
        }
    }
}
