//! Configuration for the token issuer

use chrono::Duration;
use cp_shared::config::JwtConfig;

/// Configuration for the token issuer
#[derive(Clone)]
pub struct TokenIssuerConfig {
    /// Secret for signing access tokens
    pub access_secret: String,
    /// Secret for signing refresh tokens
    pub refresh_secret: String,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// `iss` claim
    pub issuer: String,
    /// `aud` claim
    pub audience: String,
}

impl TokenIssuerConfig {
    /// Config with the given secrets and default lifetimes (15 minutes / 7 days)
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self::from(&JwtConfig::new(access_secret, refresh_secret))
    }
}

impl From<&JwtConfig> for TokenIssuerConfig {
    fn from(jwt: &JwtConfig) -> Self {
        Self {
            access_secret: jwt.access_secret.clone(),
            refresh_secret: jwt.refresh_secret.clone(),
            access_token_ttl: Duration::seconds(jwt.access_token_ttl),
            refresh_token_ttl: Duration::seconds(jwt.refresh_token_ttl),
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
        }
    }
}

impl std::fmt::Debug for TokenIssuerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuerConfig")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}
