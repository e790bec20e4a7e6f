//! Configuration module with business-specific sub-modules
//!
//! - `auth` - token signing secrets, lifetimes and session cookies
//! - `database` - database connection and pool configuration
//! - `environment` - environment detection and logging configuration
//! - `server` - HTTP server configuration

pub mod auth;
pub mod database;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{AuthConfig, CookieConfig, JwtConfig};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;

/// Errors raised while assembling configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {name}")]
    MissingVariable { name: String },

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Where user records and their refresh tokens are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// MySQL through the infrastructure crate
    Mysql,
    /// Process-local storage, for local runs only
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(StorageBackend::Mysql),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Storage backend selection
    pub storage: StorageBackend,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// Both token secrets are mandatory; everything else has a default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_lookup(&lookup);

        let mut server = ServerConfig::default();
        if let Some(host) = lookup("SERVER_HOST") {
            server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            server.port = parse_var("SERVER_PORT", &port)?;
        }

        let access_secret = required(&lookup, "ACCESS_TOKEN_SECRET")?;
        let refresh_secret = required(&lookup, "REFRESH_TOKEN_SECRET")?;
        let mut jwt = JwtConfig::new(access_secret, refresh_secret);
        if let Some(ttl) = lookup("ACCESS_TOKEN_TTL_SECONDS") {
            jwt.access_token_ttl = parse_var("ACCESS_TOKEN_TTL_SECONDS", &ttl)?;
        }
        if let Some(ttl) = lookup("REFRESH_TOKEN_TTL_SECONDS") {
            jwt.refresh_token_ttl = parse_var("REFRESH_TOKEN_TTL_SECONDS", &ttl)?;
        }

        let mut auth = AuthConfig::new(jwt);
        auth.cookies.secure = match lookup("COOKIE_SECURE") {
            Some(value) => parse_var("COOKIE_SECURE", &value)?,
            None => environment.is_production(),
        };

        let storage = match lookup("STORAGE_BACKEND") {
            Some(value) => parse_var("STORAGE_BACKEND", &value)?,
            None => StorageBackend::Mysql,
        };

        Ok(Self {
            environment,
            server,
            database: DatabaseConfig::from_lookup(&lookup),
            auth,
            storage,
            logging: LoggingConfig::for_environment(environment),
        })
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVariable {
            name: name.to_string(),
        })
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}
