//! Session service implementation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::session::{RefreshTokenRecord, RotationOutcome};
use crate::domain::entities::token::{IssuedRefreshToken, TokenPair};
use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::UserRepository;
use crate::services::token::TokenIssuer;

/// Manages the refresh token records of each user.
///
/// Every refresh token is single use. Presenting one that was already
/// rotated, revoked or never stored revokes every session of its owner.
pub struct SessionService<R>
where
    R: UserRepository + ?Sized,
{
    /// Storage for users and their refresh token records
    repository: Arc<R>,
    /// Signs and verifies tokens
    issuer: Arc<TokenIssuer>,
}

impl<R> SessionService<R>
where
    R: UserRepository + ?Sized,
{
    pub fn new(repository: Arc<R>, issuer: Arc<TokenIssuer>) -> Self {
        Self { repository, issuer }
    }

    /// The issuer used to sign this service's tokens
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Starts a new session for `user` after a successful sign-in.
    ///
    /// Stale records of the user are pruned before the new one is stored.
    ///
    /// # Returns
    ///
    /// * `Err(AuthError::UserNotFound)` - the user no longer exists
    pub async fn issue(&self, user: &User) -> Result<TokenPair, DomainError> {
        let access_token = self.issuer.issue_access_token(user)?;
        let refresh = self.issuer.issue_refresh_token(user.id)?;

        let stored = self
            .repository
            .append_refresh_token(user.id, record_for(&refresh), Utc::now())
            .await?;
        if !stored {
            return Err(AuthError::UserNotFound.into());
        }

        tracing::info!(user_id = %user.id, "Issued session tokens");
        Ok(self.issuer.pair(access_token, &refresh))
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// The presented token's record is invalidated and the replacement stored
    /// in one atomic step, so of several concurrent calls with the same token
    /// exactly one succeeds.
    ///
    /// # Returns
    ///
    /// * `Err(TokenError::InvalidToken)` - bad signature, expired or malformed
    /// * `Err(AuthError::UserNotFound)` - the token's subject does not exist
    /// * `Err(TokenError::ReplayDetected)` - no active record matched; all of
    ///   the user's sessions were revoked
    pub async fn rotate(&self, presented: &str) -> Result<TokenPair, DomainError> {
        self.rotate_at(presented, Utc::now()).await
    }

    /// Same as [`rotate`](Self::rotate) with an explicit clock reading.
    ///
    /// `now` is used both for the expiry check on the claims and for the
    /// record lookup, so a token in its final second is rejected as expired
    /// rather than treated as reuse.
    pub async fn rotate_at(
        &self,
        presented: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, DomainError> {
        let claims = self.issuer.verify_refresh_token(presented)?;
        if claims.is_expired_at(now) {
            tracing::debug!("Refresh token presented at its expiry");
            return Err(TokenError::InvalidToken.into());
        }
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidToken))?;

        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::UserNotFound))?;

        let access_token = self.issuer.issue_access_token_at(&user, now)?;
        let refresh = self.issuer.issue_refresh_token_at(user.id, now)?;

        let outcome = self
            .repository
            .rotate_refresh_token(user.id, &claims.jti, record_for(&refresh), now)
            .await?;

        match outcome {
            RotationOutcome::Rotated => {
                tracing::info!(user_id = %user.id, "Rotated refresh token");
                Ok(self.issuer.pair(access_token, &refresh))
            }
            RotationOutcome::UserNotFound => Err(AuthError::UserNotFound.into()),
            RotationOutcome::NoActiveRecord => {
                let revoked = self.repository.invalidate_all_refresh_tokens(user.id).await?;
                tracing::warn!(
                    user_id = %user.id,
                    revoked,
                    "Refresh token reuse detected, revoked all sessions"
                );
                Err(TokenError::ReplayDetected.into())
            }
        }
    }

    /// Ends the session a refresh token belongs to.
    ///
    /// Returns whether an active record was invalidated. Unknown or already
    /// consumed tokens are not treated as replay here.
    pub async fn revoke(&self, presented: &str) -> Result<bool, DomainError> {
        let claims = self.issuer.verify_refresh_token(presented)?;
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidToken))?;

        let revoked = self
            .repository
            .invalidate_refresh_token(user_id, &claims.jti)
            .await?;
        if revoked {
            tracing::info!(user_id = %user_id, "Revoked session");
        }
        Ok(revoked)
    }

    /// Ends every session of a user.
    ///
    /// Returns how many records were not yet invalidated, including ones
    /// that had already expired.
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let revoked = self.repository.invalidate_all_refresh_tokens(user_id).await?;
        tracing::info!(user_id = %user_id, revoked, "Revoked all sessions");
        Ok(revoked)
    }

    /// Number of sessions the user can still refresh
    pub async fn active_sessions(&self, user_id: Uuid) -> Result<usize, DomainError> {
        self.repository
            .count_active_sessions(user_id, Utc::now())
            .await
    }
}

fn record_for(refresh: &IssuedRefreshToken) -> RefreshTokenRecord {
    RefreshTokenRecord::new(refresh.jti.clone(), refresh.issued_at, refresh.expires_at)
}
