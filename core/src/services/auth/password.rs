//! bcrypt password hashing
//!
//! Hashing is CPU bound, so both helpers run on the blocking thread pool.

use crate::errors::DomainError;

/// Hash a password with the given bcrypt cost
pub async fn hash_password(password: &str, cost: u32) -> Result<String, DomainError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| internal("Password hashing task failed", e))?
        .map_err(|e| internal("Failed to hash password", e))
}

/// Check a password against a stored bcrypt hash.
///
/// A malformed hash counts as a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, DomainError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| internal("Password verification task failed", e))?;

    match result {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be parsed");
            Ok(false)
        }
    }
}

fn internal(context: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::Internal {
        message: format!("{}: {}", context, err),
    }
}
