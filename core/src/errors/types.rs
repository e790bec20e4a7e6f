//! Error types for authentication and session token handling

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid email or password")]
    InvalidCredentials,
}

/// Session token errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed, expired, wrongly typed or badly signed token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The presented refresh token was already consumed or never issued.
    /// Every session of the owner has been revoked.
    #[error("Refresh token reuse detected. Please log in again")]
    ReplayDetected,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}
