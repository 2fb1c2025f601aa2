use std::str::FromStr;

use axum::{
    extract::Form,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use account_auth::{Role, delete_account_admin, list_accounts, update_account_role};

use crate::error::IntoResponseError;
use crate::session::{AuthUser, verify_form_csrf};

/// One `username ROLE` line per account.
pub(crate) async fn list(user: AuthUser) -> Result<Response, (StatusCode, String)> {
    let accounts = list_accounts(&user.identity()).await.into_response_error()?;

    let body = accounts
        .iter()
        .map(|account| format!("{} {}", account.username, account.role))
        .collect::<Vec<_>>()
        .join("\n");
    Ok((StatusCode::OK, body).into_response())
}

#[derive(Deserialize)]
pub(crate) struct RoleForm {
    username: String,
    role: String,
    csrf_token: Option<String>,
}

pub(crate) async fn update_role(
    user: AuthUser,
    Form(form): Form<RoleForm>,
) -> Result<Response, (StatusCode, String)> {
    verify_form_csrf(&user, form.csrf_token.as_deref())?;

    let role = Role::from_str(&form.role)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let account = update_account_role(&user.identity(), &form.username, role)
        .await
        .into_response_error()?;

    Ok((StatusCode::OK, format!("{} {}", account.username, account.role)).into_response())
}

#[derive(Deserialize)]
pub(crate) struct DeleteForm {
    username: String,
    csrf_token: Option<String>,
}

pub(crate) async fn delete_account(
    user: AuthUser,
    Form(form): Form<DeleteForm>,
) -> Result<Response, (StatusCode, String)> {
    verify_form_csrf(&user, form.csrf_token.as_deref())?;

    delete_account_admin(&user.identity(), &form.username)
        .await
        .into_response_error()?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
