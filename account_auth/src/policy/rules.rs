use std::collections::{BTreeMap, BTreeSet};

use crate::accountdb::Role;

use super::errors::PolicyError;
use super::pattern::PathPattern;
use super::types::Requirement;

/// Built-in rule table: landing, info and the auth endpoints are public, the
/// admin area needs ADMIN, everything else needs a session.
pub(super) const DEFAULT_RULES: &str =
    "/=public;/info=public;/login=public;/logout=public;/account=public;/admin/**=role:ADMIN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

impl PolicyRule {
    pub fn new(pattern: PathPattern, requirement: Requirement) -> Self {
        Self {
            pattern,
            requirement,
        }
    }

    /// Parse one `pattern=requirement` entry.
    pub fn parse(entry: &str) -> Result<Self, PolicyError> {
        let (pattern, requirement) = entry
            .split_once('=')
            .ok_or_else(|| PolicyError::InvalidRule(entry.trim().to_string()))?;

        Ok(Self {
            pattern: pattern.parse()?,
            requirement: requirement.parse()?,
        })
    }
}

/// Ordered rule table. The first rule whose pattern matches decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    rules: Vec<PolicyRule>,
    default: Requirement,
    hierarchy: RoleHierarchy,
}

impl AccessPolicy {
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self {
            rules,
            default: Requirement::Authenticated,
            hierarchy: RoleHierarchy::default(),
        }
    }

    /// Parse rules separated by `;` or newlines, e.g. `/=public;/admin/**=role:ADMIN`.
    pub fn parse(rules: &str) -> Result<Self, PolicyError> {
        let rules = rules
            .split([';', '\n'])
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(PolicyRule::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(rules))
    }

    /// Requirement for paths no rule matches.
    pub fn with_default(mut self, default: Requirement) -> Self {
        self.default = default;
        self
    }

    pub fn with_hierarchy(mut self, hierarchy: RoleHierarchy) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    pub fn hierarchy(&self) -> &RoleHierarchy {
        &self.hierarchy
    }

    pub fn requirement_for(&self, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| rule.requirement)
            .unwrap_or(self.default)
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        match Self::parse(DEFAULT_RULES) {
            Ok(policy) => policy,
            Err(e) => {
                // Only reachable if DEFAULT_RULES itself is edited into something invalid
                tracing::error!("Built-in access policy is invalid: {}", e);
                Self::new(Vec::new())
            }
        }
    }
}

/// Optional role implications such as `ADMIN>USER`.
///
/// Empty by default, in which case a role requirement is plain set membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleHierarchy {
    implied: BTreeMap<Role, BTreeSet<Role>>,
}

impl RoleHierarchy {
    /// Parse comma- or newline-separated `HIGHER>LOWER` pairs. Chains like
    /// `A>B>C` are accepted; implications are transitive.
    pub fn parse(spec: &str) -> Result<Self, PolicyError> {
        let mut direct: BTreeMap<Role, BTreeSet<Role>> = BTreeMap::new();

        for entry in spec.split([',', '\n']).map(str::trim).filter(|e| !e.is_empty()) {
            let chain = entry
                .split('>')
                .map(|role| {
                    role.parse::<Role>()
                        .map_err(|_| PolicyError::InvalidHierarchy(entry.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;

            if chain.len() < 2 {
                return Err(PolicyError::InvalidHierarchy(entry.to_string()));
            }

            for pair in chain.windows(2) {
                direct.entry(pair[0]).or_default().insert(pair[1]);
            }
        }

        let implied = direct
            .keys()
            .map(|role| (*role, reachable(&direct, *role)))
            .collect();

        Ok(Self { implied })
    }

    pub fn is_empty(&self) -> bool {
        self.implied.is_empty()
    }

    /// True if `roles`, or any role they imply, contains `required`.
    pub fn grants(&self, roles: &BTreeSet<Role>, required: Role) -> bool {
        roles.contains(&required)
            || roles.iter().any(|role| {
                self.implied
                    .get(role)
                    .is_some_and(|implied| implied.contains(&required))
            })
    }
}

fn reachable(direct: &BTreeMap<Role, BTreeSet<Role>>, start: Role) -> BTreeSet<Role> {
    let mut seen = BTreeSet::new();
    let mut stack: Vec<Role> = direct.get(&start).into_iter().flatten().copied().collect();

    while let Some(role) = stack.pop() {
        if seen.insert(role) {
            stack.extend(direct.get(&role).into_iter().flatten().copied());
        }
    }

    seen
}
