use thiserror::Error;

use crate::utils::UtilError;

#[derive(Clone, Error, Debug)]
pub enum AccountError {
    #[error("Account not found")]
    NotFound,

    /// The username is already registered. Raised by the store's UNIQUE constraint.
    #[error("Account already exists: {0}")]
    Duplicate(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Password hash error: {0}")]
    PasswordHash(String),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<sqlx::Error> for AccountError {
    fn from(err: sqlx::Error) -> Self {
        AccountError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_display_names_the_username() {
        let err = AccountError::Duplicate("junwoo".to_string());
        assert_eq!(err.to_string(), "Account already exists: junwoo");
    }

    #[test]
    fn test_from_sqlx_error() {
        let err = AccountError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AccountError::Storage(_)));
    }

    #[test]
    fn test_from_util_error() {
        let err = AccountError::from(UtilError::Crypto("rng".to_string()));
        assert!(matches!(err, AccountError::Utils(UtilError::Crypto(_))));
    }
}
