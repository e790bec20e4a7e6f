//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Shorthand for a storage failure with context
    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        DomainError::Storage {
            message: format!("{}: {}", context, err),
        }
    }

    /// True when the error means every session of the user was revoked
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, DomainError::Token(TokenError::ReplayDetected))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
