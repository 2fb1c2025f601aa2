use axum::{Router, middleware, routing::get};
use dotenvy::dotenv;

use account_auth_axum::{AuthUser, Role, auth_router, enforce_access_policy};

mod server;
use server::{init_tracing, serve};

async fn index(user: Option<AuthUser>) -> String {
    match user {
        Some(user) => format!("Welcome back, {}.", user.username),
        None => "Welcome. Sign in at /login or register with POST /account.".to_string(),
    }
}

async fn info() -> &'static str {
    "account-auth demo: / and /info are public, /dashboard needs a session, /admin needs ADMIN."
}

async fn dashboard(user: AuthUser) -> String {
    let roles = user
        .roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("Signed in as {} ({roles})", user.username)
}

async fn admin(user: AuthUser) -> String {
    format!("Administration console for {}", user.username)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("demo_account");

    dotenv().ok();
    account_auth_axum::init().await?;

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let app = Router::new()
        .route("/", get(index))
        .route("/info", get(info))
        .route("/dashboard", get(dashboard))
        .route("/admin", get(admin))
        .merge(auth_router())
        .layer(middleware::from_fn(enforce_access_policy));

    serve(port, app).await?;
    Ok(())
}
