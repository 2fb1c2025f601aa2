use chrono::{TimeDelta, Utc};
use headers::Cookie;
use http::header::{COOKIE, HeaderMap};

use crate::accountdb::{Role, VerifiedAccount};
use crate::session::config::{SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME};
use crate::session::errors::SessionError;
use crate::session::types::{AuthState, CsrfToken, Identity, StoredSession};
use crate::storage::{CacheData, GENERIC_CACHE_STORE};
use crate::utils::{gen_random_string, header_set_cookie};

const SESSION_PREFIX: &str = "session";
const SESSION_ID_BYTES: usize = 32;
const MAX_SESSION_ID_ATTEMPTS: usize = 3;

/// A live session found from the request's cookie.
#[derive(Debug, Clone)]
pub(crate) struct SessionContext {
    pub(crate) session_id: String,
    pub(crate) identity: Identity,
    pub(crate) csrf_token: CsrfToken,
}

/// Create an authenticated session for a verified account.
///
/// The account's role is copied into the session; later role changes do not
/// reach sessions that already exist.
pub async fn establish(verified: &VerifiedAccount) -> Result<(String, Identity), SessionError> {
    create_session(
        verified.username(),
        [verified.role()],
        *SESSION_COOKIE_MAX_AGE,
    )
    .await
}

/// Create a session without a credential check. Test harness only.
#[cfg(any(test, feature = "test-utils"))]
pub(crate) async fn establish_unverified(
    username: &str,
    roles: impl IntoIterator<Item = Role>,
) -> Result<(String, Identity), SessionError> {
    create_session(username, roles, *SESSION_COOKIE_MAX_AGE).await
}

async fn create_session(
    username: &str,
    roles: impl IntoIterator<Item = Role>,
    ttl: u64,
) -> Result<(String, Identity), SessionError> {
    let expires_at = i64::try_from(ttl)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or(SessionError::InvalidTtl(ttl))?;
    let cache_ttl = usize::try_from(ttl).map_err(|_| SessionError::InvalidTtl(ttl))?;

    let identity = Identity::new(username, roles);
    let stored_session = StoredSession {
        username: identity.username.clone(),
        roles: identity.roles.clone(),
        csrf_token: gen_random_string(32)?,
        expires_at,
        ttl,
    };
    let data = CacheData::try_from(&stored_session)?;

    for attempt in 1..=MAX_SESSION_ID_ATTEMPTS {
        let session_id = gen_random_string(SESSION_ID_BYTES)?;

        let inserted = GENERIC_CACHE_STORE
            .write()
            .await
            .put_if_not_exists(SESSION_PREFIX, &session_id, data.clone(), cache_ttl)
            .await?;

        if inserted {
            tracing::info!(username = %identity.username, "Session established");
            return Ok((session_id, identity));
        }

        tracing::warn!(attempt, "Session id already in use, generating another");
    }

    Err(SessionError::IdCollision)
}

/// `Set-Cookie` headers binding the browser to `session_id`.
pub(crate) fn session_cookie_headers(session_id: &str) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        SESSION_COOKIE_NAME.as_str(),
        session_id,
        *SESSION_COOKIE_MAX_AGE as i64,
    )?;
    Ok(headers)
}

/// Remove a session. Unknown ids are ignored.
pub async fn invalidate(session_id: &str) -> Result<(), SessionError> {
    GENERIC_CACHE_STORE
        .write()
        .await
        .remove(SESSION_PREFIX, session_id)
        .await?;
    tracing::debug!("Session removed from store");
    Ok(())
}

/// Expire the session cookie and drop the session it names.
pub async fn prepare_logout_response(cookies: Cookie) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    header_set_cookie(&mut headers, SESSION_COOKIE_NAME.as_str(), "value", 0)?;

    if let Some(session_id) = cookies.get(SESSION_COOKIE_NAME.as_str()) {
        invalidate(session_id).await?;
        tracing::info!("Logged out");
    }

    Ok(headers)
}

/// Authentication state for a session id. Missing, expired and unreadable sessions are `NoSession`.
pub async fn get_auth_state(session_id: &str) -> Result<AuthState, SessionError> {
    Ok(match load_session(session_id).await? {
        Some(stored) => AuthState::Authenticated(stored.identity()),
        None => AuthState::NoSession,
    })
}

pub(crate) async fn get_session_context(
    headers: &HeaderMap,
) -> Result<Option<SessionContext>, SessionError> {
    let session_id = match get_session_id_from_headers(headers) {
        Ok(Some(session_id)) => session_id,
        Ok(None) => return Ok(None),
        Err(e) => {
            tracing::debug!("Treating request as anonymous: {}", e);
            return Ok(None);
        }
    };

    Ok(load_session(session_id)
        .await?
        .map(|stored| SessionContext {
            session_id: session_id.to_string(),
            identity: stored.identity(),
            csrf_token: CsrfToken::new(stored.csrf_token),
        }))
}

async fn load_session(session_id: &str) -> Result<Option<StoredSession>, SessionError> {
    let cached = GENERIC_CACHE_STORE
        .read()
        .await
        .get(SESSION_PREFIX, session_id)
        .await?;

    let Some(cached) = cached else {
        return Ok(None);
    };

    let stored_session: StoredSession = match cached.try_into() {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Discarding unreadable session record: {}", e);
            invalidate(session_id).await?;
            return Ok(None);
        }
    };

    if stored_session.expires_at <= Utc::now() {
        tracing::debug!("Session expired at {}", stored_session.expires_at);
        invalidate(session_id).await?;
        return Ok(None);
    }

    Ok(Some(stored_session))
}

fn get_session_id_from_headers(
    headers: &HeaderMap,
) -> Result<Option<&str>, SessionError> {
    let Some(cookie_header) = headers.get(COOKIE) else {
        tracing::debug!("No cookie header found");
        return Ok(None);
    };

    let cookie_str = cookie_header.to_str().map_err(|e| {
        tracing::debug!("Invalid cookie header: {}", e);
        SessionError::HeaderError("Invalid cookie header".to_string())
    })?;

    let cookie_name = SESSION_COOKIE_NAME.as_str();

    let session_id = cookie_str.split(';').map(|s| s.trim()).find_map(|s| {
        let mut parts = s.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(k), Some(v)) if k == cookie_name && !v.is_empty() => Some(v),
            _ => None,
        }
    });

    if session_id.is_none() {
        tracing::debug!("No session cookie '{}' found in cookies", cookie_name);
    }

    Ok(session_id)
}
