use std::fmt;
use std::str::FromStr;

use crate::accountdb::Role;

use super::errors::PolicyError;

/// What a resource demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    Role(Role),
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Public => f.write_str("public"),
            Requirement::Authenticated => f.write_str("authenticated"),
            Requirement::Role(role) => write!(f, "role:{role}"),
        }
    }
}

impl FromStr for Requirement {
    type Err = PolicyError;

    /// Accepts `public`, `authenticated` and `role:<ROLE>`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let lower = value.to_ascii_lowercase();

        match lower.as_str() {
            "public" => Ok(Requirement::Public),
            "authenticated" => Ok(Requirement::Authenticated),
            _ => {
                let role = lower
                    .strip_prefix("role:")
                    .ok_or_else(|| PolicyError::InvalidRequirement(value.to_string()))?;
                role.parse::<Role>()
                    .map(Requirement::Role)
                    .map_err(|_| PolicyError::InvalidRequirement(value.to_string()))
            }
        }
    }
}

/// Outcome of evaluating a request against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    /// No live session on a resource that needs one. Rendered as a login redirect or 401.
    Unauthenticated,
    /// Authenticated but lacking the role. Rendered as 403.
    Forbidden,
}
