//! In-memory implementation of UserRepository.
//!
//! Every operation takes the single write lock for its whole duration, which
//! makes rotation a true compare-and-set. Used by tests and by local runs
//! with `STORAGE_BACKEND=memory`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::session::{RefreshTokenRecord, RotationOutcome, UserSession};
use crate::domain::entities::user::{normalize_email, User};
use crate::errors::{AuthError, DomainError};

use super::r#trait::UserRepository;

struct Entry {
    user: User,
    session: UserSession,
}

/// Process-local user repository
#[derive(Clone)]
pub struct InMemoryUserRepository {
    entries: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether no users are stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let entries = self.entries.read().await;
        Ok(entries.get(&id).map(|entry| entry.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email = normalize_email(email);
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .find(|entry| entry.user.email == email)
            .map(|entry| entry.user.clone()))
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut entries = self.entries.write().await;

        if entries.contains_key(&user.id)
            || entries.values().any(|entry| entry.user.email == user.email)
        {
            return Err(AuthError::UserAlreadyExists.into());
        }

        entries.insert(
            user.id,
            Entry {
                user: user.clone(),
                session: UserSession::new(user.id),
            },
        );
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(&user.id)
            .ok_or(DomainError::Auth(AuthError::UserNotFound))?;
        entry.user = user.clone();
        Ok(user)
    }

    async fn find_session(&self, user_id: Uuid) -> Result<Option<UserSession>, DomainError> {
        let entries = self.entries.read().await;
        Ok(entries.get(&user_id).map(|entry| entry.session.clone()))
    }

    async fn append_refresh_token(
        &self,
        user_id: Uuid,
        record: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&user_id) {
            Some(entry) => {
                entry.session.prune(now);
                entry.session.push(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn rotate_refresh_token(
        &self,
        user_id: Uuid,
        jti: &str,
        replacement: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<RotationOutcome, DomainError> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&user_id) {
            Some(entry) => Ok(entry.session.rotate(jti, replacement, now)),
            None => Ok(RotationOutcome::UserNotFound),
        }
    }

    async fn invalidate_refresh_token(&self, user_id: Uuid, jti: &str) -> Result<bool, DomainError> {
        let mut entries = self.entries.write().await;
        Ok(entries
            .get_mut(&user_id)
            .map(|entry| entry.session.invalidate(jti))
            .unwrap_or(false))
    }

    async fn invalidate_all_refresh_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut entries = self.entries.write().await;
        Ok(entries
            .get_mut(&user_id)
            .map(|entry| entry.session.invalidate_all())
            .unwrap_or(0))
    }
}
