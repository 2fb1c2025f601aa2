use thiserror::Error;

use crate::storage::StorageError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("CSRF token error: {0}")]
    CsrfToken(String),

    #[error("Header error: {0}")]
    HeaderError(String),

    /// Every generated session id was already taken.
    #[error("Could not allocate a unique session id")]
    IdCollision,

    /// The lifetime does not fit a representable expiry time.
    #[error("Session lifetime out of range: {0}s")]
    InvalidTtl(u64),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        SessionError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error() {
        let err: SessionError = StorageError::Storage("redis down".to_string()).into();
        assert!(matches!(err, SessionError::Storage(ref msg) if msg.contains("redis down")));
    }

    #[test]
    fn test_from_util_error() {
        let err: SessionError = UtilError::Cookie("bad".to_string()).into();
        assert_eq!(err.to_string(), "Utils error: Cookie error: bad");
    }
}
