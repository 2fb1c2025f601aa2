use http::{HeaderMap, Method};

use crate::policy::{ACCESS_POLICY, AccessDecision, AccessPolicy, Requirement, evaluate};
use crate::session::{
    AuthState, CsrfHeaderVerified, CsrfToken, Identity, SessionContext, check_csrf,
    get_session_context,
};

use super::errors::CoordinationError;

/// Everything the HTTP layer needs to act on a request.
#[derive(Debug, Clone)]
pub struct Authorization {
    pub decision: AccessDecision,
    pub auth_state: AuthState,
    /// Present whenever the request carries a live session.
    pub csrf_token: Option<CsrfToken>,
    pub csrf_via_header_verified: CsrfHeaderVerified,
}

/// A live session that passed the CSRF check for the request's method.
#[derive(Debug, Clone)]
pub struct SessionAuth {
    pub identity: Identity,
    pub csrf_token: CsrfToken,
    pub csrf_via_header_verified: CsrfHeaderVerified,
}

/// Resolve the caller's session without consulting the path rules.
///
/// `Ok(None)` when there is no live session. A state-changing request whose
/// CSRF token is missing or wrong is `CoordinationError::Forbidden`.
pub async fn authenticate_request_core(
    method: &Method,
    headers: &HeaderMap,
) -> Result<Option<SessionAuth>, CoordinationError> {
    let Some(context) = get_session_context(headers).await? else {
        return Ok(None);
    };

    let csrf_via_header_verified =
        check_csrf(headers, method, &context.csrf_token).map_err(|e| {
            tracing::info!(username = %context.identity.username, "CSRF check failed: {}", e);
            CoordinationError::Forbidden
        })?;

    Ok(Some(SessionAuth {
        identity: context.identity,
        csrf_token: context.csrf_token,
        csrf_via_header_verified,
    }))
}

/// Authentication state from the request's session cookie.
pub async fn auth_state_from_headers(headers: &HeaderMap) -> Result<AuthState, CoordinationError> {
    Ok(get_session_context(headers)
        .await?
        .map(|context| AuthState::Authenticated(context.identity))
        .unwrap_or_default())
}

/// Decide a request against the configured access policy.
///
/// A live session on a non-public resource must also pass the CSRF check for
/// state-changing methods; a failed check turns `Allow` into `Forbidden`.
pub async fn authorize_request_core(
    method: &Method,
    path: &str,
    headers: &HeaderMap,
) -> Result<Authorization, CoordinationError> {
    let context = get_session_context(headers).await?;
    let authorization = decide(&ACCESS_POLICY, method, path, headers, context);

    tracing::debug!(
        %method,
        path,
        decision = ?authorization.decision,
        authenticated = authorization.auth_state.is_authenticated(),
        "Access decision"
    );

    Ok(authorization)
}

fn decide(
    policy: &AccessPolicy,
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    context: Option<SessionContext>,
) -> Authorization {
    let auth_state = context
        .as_ref()
        .map(|c| AuthState::Authenticated(c.identity.clone()))
        .unwrap_or_default();

    let mut decision = evaluate(policy, path, &auth_state);
    let mut csrf_via_header_verified = CsrfHeaderVerified(false);

    if let Some(context) = &context {
        if decision == AccessDecision::Allow && policy.requirement_for(path) != Requirement::Public {
            match check_csrf(headers, method, &context.csrf_token) {
                Ok(verified) => csrf_via_header_verified = verified,
                Err(e) => {
                    tracing::info!(username = %context.identity.username, "CSRF check failed: {}", e);
                    decision = AccessDecision::Forbidden;
                }
            }
        }
    }

    Authorization {
        decision,
        auth_state,
        csrf_token: context.map(|c| c.csrf_token),
        csrf_via_header_verified,
    }
}
