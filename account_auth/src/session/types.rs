use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accountdb::Role;
use crate::session::errors::SessionError;
use crate::storage::CacheData;

/// Who the caller is, as recorded when the session was established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub roles: BTreeSet<Role>,
}

impl Identity {
    pub fn new(username: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            username: username.into(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Authentication state of a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No cookie, or the cookie does not name a live session.
    #[default]
    NoSession,
    Authenticated(Identity),
}

impl AuthState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated(identity) => Some(identity),
            AuthState::NoSession => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Per-session token that state-changing requests must echo back.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub(crate) fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CsrfToken(..)")
    }
}

/// Whether the CSRF token arrived in the `X-CSRF-Token` header and matched.
///
/// `false` on a state-changing request means the body is a form and the
/// handler is responsible for checking its token field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsrfHeaderVerified(pub bool);

/// Session record as kept in the cache store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct StoredSession {
    pub(super) username: String,
    pub(super) roles: BTreeSet<Role>,
    pub(super) csrf_token: String,
    pub(super) expires_at: DateTime<Utc>,
    pub(super) ttl: u64,
}

impl StoredSession {
    pub(super) fn identity(&self) -> Identity {
        Identity {
            username: self.username.clone(),
            roles: self.roles.clone(),
        }
    }
}

impl TryFrom<&StoredSession> for CacheData {
    type Error = SessionError;

    fn try_from(data: &StoredSession) -> Result<Self, Self::Error> {
        Ok(Self {
            value: serde_json::to_string(data).map_err(|e| SessionError::Storage(e.to_string()))?,
        })
    }
}

impl TryFrom<CacheData> for StoredSession {
    type Error = SessionError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| SessionError::Storage(e.to_string()))
    }
}
