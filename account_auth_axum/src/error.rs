use account_auth::CoordinationError;
use http::StatusCode;

/// Map library errors onto an HTTP status and message.
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            let status = match e {
                CoordinationError::Validation(_) => StatusCode::BAD_REQUEST,
                CoordinationError::Authentication => StatusCode::UNAUTHORIZED,
                CoordinationError::Forbidden => StatusCode::FORBIDDEN,
                CoordinationError::Conflict(_) => StatusCode::CONFLICT,
                CoordinationError::Coordination(_) => StatusCode::BAD_REQUEST,
                CoordinationError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            // Storage details stay in the logs
            let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
                "Internal server error".to_string()
            } else {
                e.to_string()
            };
            (status, message)
        })
    }
}

impl<T> IntoResponseError<T> for http::Result<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }
}
