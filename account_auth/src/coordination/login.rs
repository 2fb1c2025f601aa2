use http::HeaderMap;

use crate::accountdb::{Verification, verify_credentials};
use crate::session::{Identity, establish, get_session_context, invalidate, session_cookie_headers};

use super::errors::CoordinationError;

/// Result of a password login.
#[derive(Debug)]
pub enum LoginOutcome {
    /// `headers` carry the `Set-Cookie` for the new session.
    Authenticated { headers: HeaderMap, identity: Identity },
    /// Unknown username or wrong password. No session was created.
    Failed,
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated { .. })
    }
}

/// Verify a submitted username/password and, on success, establish a session.
///
/// `request_headers` are the incoming request's headers. A session they
/// already carry is ended when the new one is issued, so a session id never
/// survives a login.
#[tracing::instrument(skip(request_headers, password), fields(username = %username))]
pub async fn login_core(
    request_headers: &HeaderMap,
    username: &str,
    password: &str,
) -> Result<LoginOutcome, CoordinationError> {
    let verified = match verify_credentials(username, password).await? {
        Verification::Success(verified) => verified,
        Verification::Failure => {
            tracing::info!("Login failed");
            return Ok(LoginOutcome::Failed);
        }
    };

    if let Some(previous) = get_session_context(request_headers).await? {
        tracing::debug!(previous_user = %previous.identity.username, "Replacing existing session");
        invalidate(&previous.session_id).await?;
    }

    let (session_id, identity) = establish(&verified).await?;
    let headers = session_cookie_headers(&session_id)?;

    tracing::info!("Login succeeded");
    Ok(LoginOutcome::Authenticated { headers, identity })
}
