//! # CareerPilot Core
//!
//! Domain layer of the CareerPilot backend: user and session entities,
//! repository interfaces, and the services that issue, rotate and revoke
//! session tokens.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{TokenPair, User, UserPublic};
pub use errors::*;
pub use repositories::{InMemoryUserRepository, UserRepository};
pub use services::{AuthService, SessionService, TokenIssuer};
