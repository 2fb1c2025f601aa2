use crate::session::AuthState;

use super::rules::AccessPolicy;
use super::types::{AccessDecision, Requirement};

/// Decide whether a caller in `state` may access `path`.
///
/// | requirement     | no session      | lacks role | has role |
/// |-----------------|-----------------|------------|----------|
/// | public          | Allow           | Allow      | Allow    |
/// | authenticated   | Unauthenticated | Allow      | Allow    |
/// | role R          | Unauthenticated | Forbidden  | Allow    |
pub fn evaluate(policy: &AccessPolicy, path: &str, state: &AuthState) -> AccessDecision {
    match (policy.requirement_for(path), state) {
        (Requirement::Public, _) => AccessDecision::Allow,
        (_, AuthState::NoSession) => AccessDecision::Unauthenticated,
        (Requirement::Authenticated, AuthState::Authenticated(_)) => AccessDecision::Allow,
        (Requirement::Role(required), AuthState::Authenticated(identity)) => {
            if policy.hierarchy().grants(&identity.roles, required) {
                AccessDecision::Allow
            } else {
                AccessDecision::Forbidden
            }
        }
    }
}
