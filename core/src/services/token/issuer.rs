//! Signs and verifies access and refresh tokens

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::domain::entities::token::{
    AccessClaims, IssuedRefreshToken, RefreshClaims, TokenPair, TokenType,
};
use crate::domain::entities::user::User;
use crate::errors::{DomainError, TokenError};

use super::config::TokenIssuerConfig;

/// Number of random bytes in a refresh token identifier
const JTI_BYTES: usize = 32;

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Issues signed token pairs.
///
/// Access and refresh tokens use separate HS256 keys. Issuing has no side
/// effects: persisting the refresh token record is the caller's job.
pub struct TokenIssuer {
    config: TokenIssuerConfig,
    access_keys: KeyPair,
    refresh_keys: KeyPair,
    validation: Validation,
}

impl TokenIssuer {
    /// Creates a new issuer
    ///
    /// # Returns
    ///
    /// * `Err(DomainError::Configuration)` - a secret is missing, both
    ///   secrets are equal, or a lifetime is not positive
    pub fn new(config: TokenIssuerConfig) -> Result<Self, DomainError> {
        if config.access_secret.trim().is_empty() {
            return Err(configuration("access token secret is not configured"));
        }
        if config.refresh_secret.trim().is_empty() {
            return Err(configuration("refresh token secret is not configured"));
        }
        if config.access_secret == config.refresh_secret {
            return Err(configuration(
                "access and refresh token secrets must be different",
            ));
        }
        if config.access_token_ttl <= chrono::Duration::zero()
            || config.refresh_token_ttl <= chrono::Duration::zero()
        {
            return Err(configuration("token lifetimes must be positive"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Ok(Self {
            access_keys: KeyPair::from_secret(&config.access_secret),
            refresh_keys: KeyPair::from_secret(&config.refresh_secret),
            validation,
            config,
        })
    }

    /// Access token lifetime in seconds
    pub fn access_expires_in(&self) -> i64 {
        self.config.access_token_ttl.num_seconds()
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_expires_in(&self) -> i64 {
        self.config.refresh_token_ttl.num_seconds()
    }

    /// Signs a short-lived access token for `user`
    pub fn issue_access_token(&self, user: &User) -> Result<String, DomainError> {
        self.issue_access_token_at(user, Utc::now())
    }

    /// Signs an access token as if issued at `issued_at`
    pub fn issue_access_token_at(
        &self,
        user: &User,
        issued_at: DateTime<Utc>,
    ) -> Result<String, DomainError> {
        let expires_at = issued_at + self.config.access_token_ttl;
        let claims = AccessClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
            typ: TokenType::Access,
        };
        sign(&claims, &self.access_keys.encoding)
    }

    /// Signs a long-lived refresh token with a fresh identifier
    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<IssuedRefreshToken, DomainError> {
        self.issue_refresh_token_at(user_id, Utc::now())
    }

    /// Signs a refresh token as if issued at `issued_at`.
    ///
    /// Timestamps are truncated to whole seconds so the record expiry matches
    /// the `exp` claim exactly.
    pub fn issue_refresh_token_at(
        &self,
        user_id: Uuid,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedRefreshToken, DomainError> {
        let issued_at = DateTime::<Utc>::from_timestamp(issued_at.timestamp(), 0)
            .ok_or(DomainError::Token(TokenError::TokenGenerationFailed))?;
        let expires_at = issued_at + self.config.refresh_token_ttl;
        let jti = generate_jti();

        let claims = RefreshClaims {
            sub: user_id.to_string(),
            jti: jti.clone(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            typ: TokenType::Refresh,
        };
        let token = sign(&claims, &self.refresh_keys.encoding)?;

        Ok(IssuedRefreshToken {
            token,
            jti,
            issued_at,
            expires_at,
        })
    }

    /// Builds the client-facing pair from already minted tokens
    pub fn pair(&self, access_token: String, refresh: &IssuedRefreshToken) -> TokenPair {
        TokenPair {
            access_token,
            refresh_token: refresh.token.clone(),
            access_expires_in: self.access_expires_in(),
            refresh_expires_in: self.refresh_expires_in(),
        }
    }

    /// Verifies an access token and returns its claims
    ///
    /// # Returns
    ///
    /// * `Err(TokenError::InvalidToken)` - bad signature, expired, wrong
    ///   issuer/audience, or not an access token
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, DomainError> {
        let claims: AccessClaims = self.decode(token, &self.access_keys.decoding)?;
        if claims.typ != TokenType::Access {
            return Err(TokenError::InvalidToken.into());
        }
        Ok(claims)
    }

    /// Verifies a refresh token's signature and expiry and returns its claims
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, DomainError> {
        let claims: RefreshClaims = self.decode(token, &self.refresh_keys.decoding)?;
        if claims.typ != TokenType::Refresh {
            return Err(TokenError::InvalidToken.into());
        }
        Ok(claims)
    }

    fn decode<T: DeserializeOwned>(&self, token: &str, key: &DecodingKey) -> Result<T, DomainError> {
        decode::<T>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("Rejected expired token"),
                    ErrorKind::InvalidSignature => tracing::debug!("Rejected token with bad signature"),
                    kind => tracing::debug!(?kind, "Rejected malformed token"),
                }
                DomainError::Token(TokenError::InvalidToken)
            })
    }
}

fn sign<T: serde::Serialize>(claims: &T, key: &EncodingKey) -> Result<String, DomainError> {
    encode(&Header::new(Algorithm::HS256), claims, key)
        .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
}

/// 256 bits from the OS RNG, hex encoded
fn generate_jti() -> String {
    let mut bytes = [0u8; JTI_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn configuration(message: &str) -> DomainError {
    DomainError::Configuration {
        message: message.to_string(),
    }
}
