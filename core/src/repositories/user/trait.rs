//! User repository trait defining the interface for account and session
//! persistence.
//!
//! Refresh token records belong to the user aggregate, so the same trait
//! covers both the profile and the session collection. Every method that
//! touches refresh tokens is a single atomic operation against storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::session::{RefreshTokenRecord, RotationOutcome, UserSession};
use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User aggregate persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with given ID
    /// * `Err(DomainError)` - Storage error occurred
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user by normalized (trimmed, lower-cased) email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Create a new user with an empty session collection
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user
    /// * `Err(DomainError::Auth(AuthError::UserAlreadyExists))` - Email taken
    ///
    /// # Example
    /// ```no_run
    /// # use cp_core::repositories::UserRepository;
    /// # use cp_core::domain::entities::user::User;
    /// # async fn example(repo: &impl UserRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let user = User::new("ada@example.com", "Ada", "bcrypt-hash".to_string());
    /// let saved = repo.create(user).await?;
    /// println!("User created with ID: {}", saved.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Update profile fields of an existing user
    ///
    /// # Returns
    /// * `Err(DomainError::Auth(AuthError::UserNotFound))` - No such user
    async fn update(&self, user: User) -> Result<User, DomainError>;

    /// Load the refresh token collection of a user
    ///
    /// # Returns
    /// * `Ok(None)` - The user does not exist
    async fn find_session(&self, user_id: Uuid) -> Result<Option<UserSession>, DomainError>;

    /// Append a newly issued refresh token record, pruning invalidated and
    /// expired records in the same write
    ///
    /// # Returns
    /// * `Ok(true)` - Record stored
    /// * `Ok(false)` - The user does not exist
    async fn append_refresh_token(
        &self,
        user_id: Uuid,
        record: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Atomically consume the active record `jti` and store `replacement`.
    ///
    /// Equivalent to a compare-and-set on `(user_id, jti, invalidated =
    /// false, expires_at > now)`. When it succeeds the collection is pruned
    /// in the same write. Two concurrent calls with the same `jti` must never
    /// both return [`RotationOutcome::Rotated`].
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use uuid::Uuid;
    /// # use cp_core::repositories::UserRepository;
    /// # use cp_core::domain::entities::session::{RefreshTokenRecord, RotationOutcome};
    /// # async fn example(repo: &impl UserRepository, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
    /// let now = Utc::now();
    /// let replacement = RefreshTokenRecord::new("new-jti", now, now + Duration::days(7));
    ///
    /// match repo.rotate_refresh_token(user_id, "old-jti", replacement, now).await? {
    ///     RotationOutcome::Rotated => println!("rotated"),
    ///     RotationOutcome::NoActiveRecord => println!("replay"),
    ///     RotationOutcome::UserNotFound => println!("no such user"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn rotate_refresh_token(
        &self,
        user_id: Uuid,
        jti: &str,
        replacement: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<RotationOutcome, DomainError>;

    /// Invalidate a single record
    ///
    /// # Returns
    /// * `Ok(true)` - The record was active and is now invalidated
    /// * `Ok(false)` - Unknown jti, already invalidated, or unknown user
    async fn invalidate_refresh_token(&self, user_id: Uuid, jti: &str) -> Result<bool, DomainError>;

    /// Invalidate every record of a user
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records that changed
    async fn invalidate_all_refresh_tokens(&self, user_id: Uuid) -> Result<usize, DomainError>;

    /// Count records usable for rotation
    async fn count_active_sessions(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        Ok(self
            .find_session(user_id)
            .await?
            .map(|session| session.active_count(now))
            .unwrap_or(0))
    }
}
