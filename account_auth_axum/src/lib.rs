//! Axum integration for `account-auth`.
//!
//! Provides the [`enforce_access_policy`] middleware, the [`AuthUser`]
//! extractor and a router with the login, logout and account endpoints.
//!
//! ```no_run
//! use axum::{Router, middleware, routing::get};
//! use account_auth_axum::{auth_router, enforce_access_policy};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! account_auth_axum::init().await?;
//!
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "home" }))
//!     .merge(auth_router())
//!     .layer(middleware::from_fn(enforce_access_policy));
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod middleware;
mod pages;
mod router;
mod session;

pub use config::AUTH_RESPOND_WITH_X_CSRF_TOKEN;
pub use error::IntoResponseError;
pub use middleware::enforce_access_policy;
pub use router::{auth_router, auth_router_no_trace};
pub use session::{AuthRedirect, AuthRejection, AuthUser};

pub use account_auth::{AUTH_LOGIN_URL, AUTH_REDIRECT_USER, Role, SESSION_COOKIE_NAME, init};
