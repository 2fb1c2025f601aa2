use std::{env, sync::LazyLock};

use super::rules::{AccessPolicy, RoleHierarchy};
use super::types::Requirement;

/// Process-wide policy built from `ACCESS_POLICY_RULES`, `ACCESS_POLICY_DEFAULT`
/// and `ROLE_HIERARCHY`. Each setting that fails to parse is logged and
/// replaced by its built-in value.
pub(crate) static ACCESS_POLICY: LazyLock<AccessPolicy> = LazyLock::new(|| {
    let policy = build_policy(
        env::var("ACCESS_POLICY_RULES").ok().as_deref(),
        env::var("ACCESS_POLICY_DEFAULT").ok().as_deref(),
        env::var("ROLE_HIERARCHY").ok().as_deref(),
    );
    tracing::info!(rules = policy.rules().len(), "Access policy loaded");
    policy
});

fn build_policy(
    rules: Option<&str>,
    default: Option<&str>,
    hierarchy: Option<&str>,
) -> AccessPolicy {
    let policy = match rules {
        Some(rules) => AccessPolicy::parse(rules).unwrap_or_else(|e| {
            tracing::error!("ACCESS_POLICY_RULES rejected, using built-in rules: {}", e);
            AccessPolicy::default()
        }),
        None => AccessPolicy::default(),
    };

    let default = match default {
        Some(value) => value.parse::<Requirement>().unwrap_or_else(|e| {
            tracing::error!("ACCESS_POLICY_DEFAULT rejected, using 'authenticated': {}", e);
            Requirement::Authenticated
        }),
        None => Requirement::Authenticated,
    };

    let hierarchy = match hierarchy {
        Some(value) => RoleHierarchy::parse(value).unwrap_or_else(|e| {
            tracing::error!("ROLE_HIERARCHY rejected, using exact role matching: {}", e);
            RoleHierarchy::default()
        }),
        None => RoleHierarchy::default(),
    };

    policy.with_default(default).with_hierarchy(hierarchy)
}
