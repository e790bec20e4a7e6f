//! Domain entities representing core business objects.

pub mod session;
pub mod token;
pub mod user;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use session::{RefreshTokenRecord, RotationOutcome, UserSession};
pub use token::{AccessClaims, IssuedRefreshToken, RefreshClaims, TokenPair, TokenType};
pub use user::{normalize_email, AuthProvider, User, UserPublic};
