//! Domain-level error types.

use thiserror::Error;

use crate::domain::FieldViolation;

/// Domain errors - business logic failures.
///
/// "Not found" is deliberately absent: missing entities are modeled as
/// `Ok(None)` (or a zero deleted count) by the service layer, never as
/// an error.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {}", format_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            other => DomainError::Internal(other.to_string()),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
