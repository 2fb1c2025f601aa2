use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Invalid path pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid requirement: {0}")]
    InvalidRequirement(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid role hierarchy: {0}")]
    InvalidHierarchy(String),
}
