//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, InfraError, TokenError, ValidationError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Infrastructure(#[from] InfraError),
}

impl DomainError {
    /// Whether the failure came from a backing store rather than a business rule
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, DomainError::Infrastructure(_))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Infrastructure(InfraError::Serialization {
            message: err.to_string(),
        })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
