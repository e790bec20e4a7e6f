//! Authentication service module
//!
//! Account sign-up and sign-in. Every successful sign-in starts a new
//! refresh token session through the session service.

mod config;
mod password;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use password::{hash_password, verify_password};
pub use service::AuthService;
pub use types::{AuthenticatedSession, ExternalIdentity, LoginInput, SignupInput};
