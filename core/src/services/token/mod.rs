//! Token issuing and verification
//!
//! Access and refresh tokens are HS256 JWTs signed with separate secrets.
//! Refresh tokens carry a random `jti` that ties them to a stored record.

mod config;
mod issuer;


pub use config::TokenIssuerConfig;
pub use issuer::TokenIssuer;
