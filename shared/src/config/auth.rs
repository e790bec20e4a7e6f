//! Authentication configuration: token signing and session cookies

use serde::{Deserialize, Serialize};

/// Default access token lifetime (15 minutes)
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 15 * 60;

/// Default refresh token lifetime (7 days)
pub const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// JWT signing configuration.
///
/// Access and refresh tokens are signed with separate secrets so that a
/// leaked access secret cannot be used to mint refresh tokens.
#[derive(Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret for signing access tokens
    pub access_secret: String,

    /// Secret for signing refresh tokens
    pub refresh_secret: String,

    /// Access token lifetime in seconds
    pub access_token_ttl: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_ttl: i64,

    /// `iss` claim
    pub issuer: String,

    /// `aud` claim
    pub audience: String,
}

impl JwtConfig {
    /// Create a configuration with the given secrets and default lifetimes
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            issuer: String::from("careerpilot"),
            audience: String::from("careerpilot-api"),
        }
    }

    /// Set access token lifetime in seconds
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_token_ttl = seconds;
        self
    }

    /// Set refresh token lifetime in seconds
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl = seconds;
        self
    }
}

// Secrets stay out of Debug output so config dumps in logs are safe.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieConfig {
    /// Cookie carrying the access token
    pub access_cookie_name: String,

    /// Cookie carrying the refresh token
    pub refresh_cookie_name: String,

    /// Secure flag (HTTPS only)
    pub secure: bool,

    /// SameSite attribute
    pub same_site: String,

    /// Cookie path
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_cookie_name: String::from("token"),
            refresh_cookie_name: String::from("refreshToken"),
            secure: false,
            same_site: String::from("Lax"),
            path: String::from("/"),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Cookie configuration
    #[serde(default)]
    pub cookies: CookieConfig,
}

impl AuthConfig {
    /// Create an auth configuration with default cookies
    pub fn new(jwt: JwtConfig) -> Self {
        Self {
            jwt,
            cookies: CookieConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_defaults() {
        let config = JwtConfig::new("access", "refresh");
        assert_eq!(config.access_token_ttl, 900);
        assert_eq!(config.refresh_token_ttl, 604800);
        assert_eq!(config.issuer, "careerpilot");
    }

    #[test]
    fn test_jwt_config_debug_hides_secrets() {
        let config = JwtConfig::new("super-access", "super-refresh");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-access"));
        assert!(!rendered.contains("super-refresh"));
    }

    #[test]
    fn test_cookie_config_default() {
        let config = CookieConfig::default();
        assert_eq!(config.access_cookie_name, "token");
        assert_eq!(config.refresh_cookie_name, "refreshToken");
        assert!(!config.secure);
    }
}
