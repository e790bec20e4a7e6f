//! Shared configuration and error envelope for the CareerPilot server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - The JSON error response envelope and error codes

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, ConfigError, CookieConfig, DatabaseConfig, Environment, JwtConfig,
    LogFormat, LoggingConfig, ServerConfig, StorageBackend,
};
pub use errors::{error_codes, ErrorResponse};
