//! Business services containing domain logic and use cases.

pub mod auth;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use auth::{
    AuthService, AuthServiceConfig, AuthenticatedSession, ExternalIdentity, LoginInput,
    SignupInput,
};
pub use session::SessionService;
pub use token::{TokenIssuer, TokenIssuerConfig};
