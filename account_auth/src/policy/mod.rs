//! Per-resource access rules and the decision function over them.

mod config;
mod errors;
mod evaluate;
mod pattern;
mod rules;
mod types;

pub use errors::PolicyError;
pub use evaluate::evaluate;
pub use pattern::PathPattern;
pub use rules::{AccessPolicy, PolicyRule, RoleHierarchy};
pub use types::{AccessDecision, Requirement};

pub(crate) use config::ACCESS_POLICY;
