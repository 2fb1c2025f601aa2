//! Routes for login, logout, registration and account administration

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::pages;

/// All authentication endpoints with HTTP request tracing.
///
/// - `GET /login`, `POST /login`
/// - `GET /logout`
/// - `POST /account`, `POST /account/password`
/// - `GET /admin/accounts`, `POST /admin/role`, `POST /admin/delete`
///
/// The routes do not enforce the access policy on their own; layer
/// [`crate::enforce_access_policy`] over the application that merges them.
pub fn auth_router() -> Router {
    auth_router_no_trace().layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as [`auth_router`] without the tracing layer.
pub fn auth_router_no_trace() -> Router {
    Router::new()
        .route("/login", get(pages::login_page).post(pages::login))
        .route("/logout", get(pages::logout))
        .route("/account", post(pages::register))
        .route("/account/password", post(pages::change_password))
        .route("/admin/accounts", get(pages::list))
        .route("/admin/role", post(pages::update_role))
        .route("/admin/delete", post(pages::delete_account))
}
