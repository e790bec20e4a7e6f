//! Main authentication service implementation

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::domain::entities::user::{normalize_email, User, UserPublic};
use crate::errors::{AuthError, DomainError};
use crate::repositories::UserRepository;
use crate::services::session::SessionService;

use super::config::AuthServiceConfig;
use super::password::{hash_password, verify_password};
use super::types::{AuthenticatedSession, ExternalIdentity, LoginInput, SignupInput};

/// bcrypt ignores input past this many bytes
const MAX_PASSWORD_BYTES: usize = 72;

const MAX_NAME_LENGTH: usize = 100;

/// Authentication service for account sign-up and sign-in
pub struct AuthService<R>
where
    R: UserRepository + ?Sized,
{
    /// User repository for account persistence
    user_repository: Arc<R>,
    /// Starts a session after each successful sign-in
    sessions: Arc<SessionService<R>>,
    /// Service configuration
    config: AuthServiceConfig,
}

impl<R> AuthService<R>
where
    R: UserRepository + ?Sized,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `user_repository` - Repository for user data persistence
    /// * `sessions` - Session service sharing the same repository
    /// * `config` - Service configuration
    pub fn new(
        user_repository: Arc<R>,
        sessions: Arc<SessionService<R>>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            user_repository,
            sessions,
            config,
        }
    }

    /// Register a password account and sign it in
    ///
    /// # Returns
    ///
    /// * `Err(DomainError::Validation)` - malformed email, empty name or weak password
    /// * `Err(AuthError::UserAlreadyExists)` - the email is taken
    pub async fn signup(&self, input: SignupInput) -> Result<AuthenticatedSession, DomainError> {
        let email = validate_email(&input.email)?;
        let name = validate_name(&input.name)?;
        self.validate_password(&input.password)?;

        if self.user_repository.find_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let password_hash = hash_password(&input.password, self.config.password_hash_cost).await?;
        let mut user = User::new(email, name, password_hash);
        user.record_login(Utc::now());
        let user = self.user_repository.create(user).await?;

        tracing::info!(user_id = %user.id, "Registered new account");
        self.start_session(user).await
    }

    /// Sign in with email and password
    ///
    /// Unknown emails, wrong passwords and accounts without a password all
    /// fail with the same `InvalidCredentials` error.
    pub async fn login(&self, input: LoginInput) -> Result<AuthenticatedSession, DomainError> {
        let email = normalize_email(&input.email);

        let Some(mut user) = self.user_repository.find_by_email(&email).await? else {
            tracing::debug!("Login for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };
        let Some(hash) = user.password_hash.as_deref() else {
            tracing::debug!(user_id = %user.id, "Password login for external account");
            return Err(AuthError::InvalidCredentials.into());
        };
        if !verify_password(&input.password, hash).await? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        user.record_login(Utc::now());
        let user = self.user_repository.update(user).await?;
        self.start_session(user).await
    }

    /// Sign in with an identity confirmed by an external provider, creating
    /// the account on first use
    pub async fn sign_in_external(
        &self,
        identity: ExternalIdentity,
    ) -> Result<AuthenticatedSession, DomainError> {
        let email = validate_email(&identity.email)?;

        let user = match self.user_repository.find_by_email(&email).await? {
            Some(mut user) => {
                user.record_login(Utc::now());
                self.user_repository.update(user).await?
            }
            None => {
                let name = validate_name(&identity.name)?;
                let mut user = User::new_external(email, name, identity.provider);
                user.record_login(Utc::now());
                let user = self.user_repository.create(user).await?;
                tracing::info!(
                    user_id = %user.id,
                    provider = %identity.provider,
                    "Registered new account"
                );
                user
            }
        };

        self.start_session(user).await
    }

    /// Public profile of the signed-in user
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserPublic, DomainError> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .map(UserPublic::from)
            .ok_or(DomainError::Auth(AuthError::UserNotFound))
    }

    async fn start_session(&self, user: User) -> Result<AuthenticatedSession, DomainError> {
        let tokens = self.sessions.issue(&user).await?;
        Ok(AuthenticatedSession {
            user: UserPublic::from(user),
            tokens,
        })
    }

    fn validate_password(&self, password: &str) -> Result<(), DomainError> {
        if password.chars().count() < self.config.min_password_length {
            return Err(validation(format!(
                "Password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(validation(format!(
                "Password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<String, DomainError> {
    let email = normalize_email(email);
    if !email.validate_email() {
        return Err(validation("Invalid email address".to_string()));
    }
    Ok(email)
}

fn validate_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(validation("Name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(validation(format!(
            "Name must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

fn validation(message: String) -> DomainError {
    DomainError::Validation { message }
}
