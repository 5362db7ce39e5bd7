//! Domain errors for the clearkeeper reconciliation engine.

use thiserror::Error;

/// Domain-level errors that can occur while resolving, classifying, or
/// reconciling a guild member.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid display identity: {0}")]
    InvalidIdentity(String),

    #[error("Guild member not found: {0}")]
    MemberNotFound(String),

    #[error("Guild role not found: {0}")]
    RoleNotFound(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
