use crate::accountdb::{Account, AccountError, AccountStore, Role};
use crate::session::Identity;

use super::errors::CoordinationError;

fn require_admin(caller: &Identity, action: &str) -> Result<(), CoordinationError> {
    if !caller.has_role(Role::Admin) {
        tracing::debug!(caller = %caller.username, "Caller is not authorized to {}", action);
        return Err(CoordinationError::Forbidden.log());
    }
    Ok(())
}

fn not_found(username: &str) -> CoordinationError {
    CoordinationError::ResourceNotFound {
        resource_type: "Account".to_string(),
        resource_id: username.to_string(),
    }
    .log()
}

pub async fn list_accounts(caller: &Identity) -> Result<Vec<Account>, CoordinationError> {
    require_admin(caller, "list accounts")?;

    AccountStore::get_all_accounts()
        .await
        .map_err(|e| CoordinationError::Database(e.to_string()))
}

/// Change another account's role. The caller's identity must hold ADMIN.
///
/// Sessions already issued to `username` keep the role they were created with.
pub async fn update_account_role(
    caller: &Identity,
    username: &str,
    role: Role,
) -> Result<Account, CoordinationError> {
    require_admin(caller, "update roles")?;

    let account = AccountStore::update_role(username, role)
        .await
        .map_err(|e| match e {
            AccountError::NotFound => not_found(username),
            e => e.into(),
        })?;

    tracing::info!(
        admin = %caller.username,
        username = %account.username,
        role = %account.role,
        "Account role updated"
    );
    Ok(account)
}

pub async fn delete_account_admin(caller: &Identity, username: &str) -> Result<(), CoordinationError> {
    require_admin(caller, "delete accounts")?;

    if caller.username == username {
        return Err(CoordinationError::Coordination(
            "Administrators cannot delete their own account".to_string(),
        )
        .log());
    }

    AccountStore::get_account(username)
        .await?
        .ok_or_else(|| not_found(username))?;
    AccountStore::delete_account(username).await?;

    tracing::info!(admin = %caller.username, username = %username, "Account deleted");
    Ok(())
}
