use axum::{
    extract::Form,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use account_auth::{Role, register_account, update_account_password};

use crate::error::IntoResponseError;
use crate::session::{AuthUser, verify_form_csrf};

#[derive(Deserialize)]
pub(crate) struct RegisterForm {
    username: String,
    password: String,
}

/// Self-service registration. New accounts always get the USER role.
pub(crate) async fn register(
    Form(form): Form<RegisterForm>,
) -> Result<Response, (StatusCode, String)> {
    let account = register_account(&form.username, &form.password, Role::User)
        .await
        .into_response_error()?;

    Ok((StatusCode::CREATED, account.username).into_response())
}

#[derive(Deserialize)]
pub(crate) struct PasswordForm {
    current_password: String,
    new_password: String,
    csrf_token: Option<String>,
}

pub(crate) async fn change_password(
    user: AuthUser,
    Form(form): Form<PasswordForm>,
) -> Result<Response, (StatusCode, String)> {
    verify_form_csrf(&user, form.csrf_token.as_deref())?;

    update_account_password(&user.identity(), &form.current_password, &form.new_password)
        .await
        .into_response_error()?;

    Ok((StatusCode::OK, "Password updated").into_response())
}
