//! Error types for the coordination layer

use thiserror::Error;

use crate::accountdb::AccountError;
use crate::session::SessionError;
use crate::utils::UtilError;

/// Errors that can occur while coordinating accounts, sessions and policy
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// General coordination error
    #[error("Coordination error: {0}")]
    Coordination(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Rejected input such as an empty username
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credentials did not verify
    #[error("Authentication failed")]
    Authentication,

    /// Authenticated caller lacks the required role
    #[error("Forbidden")]
    Forbidden,

    /// Conflict error
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found with context
    #[error("Resource not found: {resource_type} {resource_id}")]
    ResourceNotFound {
        resource_type: String,
        resource_id: String,
    },

    /// Error from account database operations
    #[error("Account error: {0}")]
    AccountError(AccountError),

    /// Error from Session operations
    #[error("Session error: {0}")]
    SessionError(SessionError),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    UtilsError(UtilError),
}

impl CoordinationError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::Coordination(msg) => tracing::error!("Coordination error: {}", msg),
            Self::Database(msg) => tracing::error!("Database error: {}", msg),
            Self::Validation(msg) => tracing::debug!("Validation error: {}", msg),
            Self::Authentication => tracing::info!("Authentication failed"),
            Self::Forbidden => tracing::error!("Forbidden"),
            Self::Conflict(message) => tracing::info!("Conflict: {}", message),
            Self::ResourceNotFound {
                resource_type,
                resource_id,
            } => tracing::error!("Resource not found: {} {}", resource_type, resource_id),
            Self::AccountError(err) => tracing::error!("Account error: {}", err),
            Self::SessionError(err) => tracing::error!("Session error: {}", err),
            Self::UtilsError(err) => tracing::error!("Utils error: {}", err),
        }
        self
    }
}

// From implementations log as they convert

impl From<AccountError> for CoordinationError {
    fn from(err: AccountError) -> Self {
        let error = match err {
            AccountError::Duplicate(username) => {
                Self::Conflict(format!("Username '{username}' is already registered"))
            }
            AccountError::NotFound => Self::ResourceNotFound {
                resource_type: "Account".to_string(),
                resource_id: String::new(),
            },
            err => Self::AccountError(err),
        };
        error.log()
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        let error = Self::SessionError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UtilError> for CoordinationError {
    fn from(err: UtilError) -> Self {
        let error = Self::UtilsError(err);
        tracing::error!("{}", error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_sync_send<T: Sync + Send>() {}
        assert_sync_send::<CoordinationError>();
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            CoordinationError::Authentication.to_string(),
            "Authentication failed"
        );
        assert_eq!(
            CoordinationError::Conflict("taken".to_string()).to_string(),
            "Conflict: taken"
        );
        assert_eq!(
            CoordinationError::ResourceNotFound {
                resource_type: "Account".to_string(),
                resource_id: "junwoo".to_string(),
            }
            .to_string(),
            "Resource not found: Account junwoo"
        );
    }

    #[test]
    fn test_duplicate_account_becomes_conflict() {
        let err: CoordinationError = AccountError::Duplicate("junwoo".to_string()).into();
        assert!(matches!(err, CoordinationError::Conflict(ref msg) if msg.contains("junwoo")));
    }

    #[test]
    fn test_storage_account_error_is_wrapped() {
        let err: CoordinationError = AccountError::Storage("down".to_string()).into();
        assert!(matches!(
            err,
            CoordinationError::AccountError(AccountError::Storage(_))
        ));
    }

    #[test]
    fn test_log_returns_self() {
        let err = CoordinationError::Forbidden.log();
        assert!(matches!(err, CoordinationError::Forbidden));
    }
}
