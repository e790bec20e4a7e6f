//! MySQL implementation of the UserRepository trait.
//!
//! Users live in `users`, their refresh token records in `refresh_tokens`.
//! Every session mutation runs in a transaction that first locks the user
//! row with `SELECT ... FOR UPDATE`, so concurrent rotations of the same
//! user are serialized and the conditional update decides the single winner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Row, Transaction};
use uuid::Uuid;

use cp_core::domain::entities::session::{RefreshTokenRecord, RotationOutcome, UserSession};
use cp_core::domain::entities::user::{normalize_email, AuthProvider, User};
use cp_core::errors::{AuthError, DomainError};
use cp_core::repositories::UserRepository;

const USER_COLUMNS: &str = "id, email, name, password_hash, auth_provider, \
                            created_at, updated_at, last_login_at";

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &MySqlRow) -> Result<User, DomainError> {
        let id: String = row.try_get("id").map_err(|e| column("id", e))?;
        let provider: String = row
            .try_get("auth_provider")
            .map_err(|e| column("auth_provider", e))?;

        Ok(User {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::storage("Invalid user UUID", e))?,
            email: row.try_get("email").map_err(|e| column("email", e))?,
            name: row.try_get("name").map_err(|e| column("name", e))?,
            password_hash: row
                .try_get("password_hash")
                .map_err(|e| column("password_hash", e))?,
            auth_provider: provider
                .parse::<AuthProvider>()
                .map_err(|e| DomainError::storage("Invalid auth provider", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column("created_at", e))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| column("updated_at", e))?,
            last_login_at: row
                .try_get::<Option<DateTime<Utc>>, _>("last_login_at")
                .map_err(|e| column("last_login_at", e))?,
        })
    }

    /// Convert database row to RefreshTokenRecord
    fn row_to_record(row: &MySqlRow) -> Result<RefreshTokenRecord, DomainError> {
        Ok(RefreshTokenRecord::restore(
            row.try_get::<String, _>("jti").map_err(|e| column("jti", e))?,
            row.try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column("created_at", e))?,
            row.try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| column("expires_at", e))?,
            row.try_get::<bool, _>("invalidated")
                .map_err(|e| column("invalidated", e))?,
        ))
    }

    async fn begin(&self) -> Result<Transaction<'_, MySql>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(|e| failure("Failed to begin transaction", e))
    }

    /// Locks the user row for the rest of the transaction.
    /// Returns `false` if the user does not exist.
    async fn lock_user(tx: &mut Transaction<'_, MySql>, user_id: Uuid) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT id FROM users WHERE id = ? FOR UPDATE")
            .bind(user_id.to_string())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| failure("Failed to lock user", e))?;
        Ok(row.is_some())
    }

    async fn insert_record(
        tx: &mut Transaction<'_, MySql>,
        user_id: Uuid,
        record: &RefreshTokenRecord,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (jti, user_id, created_at, expires_at, invalidated)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.jti)
        .bind(user_id.to_string())
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.is_invalidated())
        .execute(&mut **tx)
        .await
        .map_err(|e| failure("Failed to store refresh token", e))?;
        Ok(())
    }

    async fn prune(
        tx: &mut Transaction<'_, MySql>,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens WHERE user_id = ? AND (invalidated = TRUE OR expires_at <= ?)",
        )
        .bind(user_id.to_string())
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(|e| failure("Failed to prune refresh tokens", e))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE id = ? LIMIT 1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| failure("Failed to load user", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE email = ? LIMIT 1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| failure("Failed to load user", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                id, email, name, password_hash, auth_provider,
                created_at, updated_at, last_login_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.auth_provider.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.last_login_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::UserAlreadyExists.into())
            }
            Err(e) => Err(failure("Failed to create user", e)),
        }
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = ?, name = ?, password_hash = ?, auth_provider = ?,
                updated_at = ?, last_login_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.auth_provider.as_str())
        .bind(user.updated_at)
        .bind(user.last_login_at)
        .bind(user.id.to_string())
        .execute(&self.pool)
        .await;

        match result {
            // MySQL reports changed rows, so zero can also mean "identical values"
            Ok(done) if done.rows_affected() == 0 => match self.find_by_id(user.id).await? {
                Some(_) => Ok(user),
                None => Err(AuthError::UserNotFound.into()),
            },
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::UserAlreadyExists.into())
            }
            Err(e) => Err(failure("Failed to update user", e)),
        }
    }

    async fn find_session(&self, user_id: Uuid) -> Result<Option<UserSession>, DomainError> {
        if self.find_by_id(user_id).await?.is_none() {
            return Ok(None);
        }

        let rows = sqlx::query(
            r#"
            SELECT jti, created_at, expires_at, invalidated
            FROM refresh_tokens
            WHERE user_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| failure("Failed to load refresh tokens", e))?;

        let records = rows
            .iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(UserSession::from_records(user_id, records)))
    }

    async fn append_refresh_token(
        &self,
        user_id: Uuid,
        record: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tx = self.begin().await?;

        if !Self::lock_user(&mut tx, user_id).await? {
            return Ok(false);
        }
        Self::prune(&mut tx, user_id, now).await?;
        Self::insert_record(&mut tx, user_id, &record).await?;

        tx.commit()
            .await
            .map_err(|e| failure("Failed to commit refresh token", e))?;
        Ok(true)
    }

    async fn rotate_refresh_token(
        &self,
        user_id: Uuid,
        jti: &str,
        replacement: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<RotationOutcome, DomainError> {
        let mut tx = self.begin().await?;

        if !Self::lock_user(&mut tx, user_id).await? {
            return Ok(RotationOutcome::UserNotFound);
        }

        let consumed = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET invalidated = TRUE
            WHERE user_id = ? AND jti = ? AND invalidated = FALSE AND expires_at > ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(jti)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| failure("Failed to consume refresh token", e))?;

        if consumed.rows_affected() != 1 {
            // Dropping the transaction rolls it back
            return Ok(RotationOutcome::NoActiveRecord);
        }

        Self::insert_record(&mut tx, user_id, &replacement).await?;
        Self::prune(&mut tx, user_id, now).await?;

        tx.commit()
            .await
            .map_err(|e| failure("Failed to commit rotation", e))?;
        Ok(RotationOutcome::Rotated)
    }

    async fn invalidate_refresh_token(&self, user_id: Uuid, jti: &str) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET invalidated = TRUE WHERE user_id = ? AND jti = ? AND invalidated = FALSE",
        )
        .bind(user_id.to_string())
        .bind(jti)
        .execute(&self.pool)
        .await
        .map_err(|e| failure("Failed to invalidate refresh token", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn invalidate_all_refresh_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET invalidated = TRUE WHERE user_id = ? AND invalidated = FALSE",
        )
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| failure("Failed to invalidate refresh tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn count_active_sessions(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS active
            FROM refresh_tokens
            WHERE user_id = ? AND invalidated = FALSE AND expires_at > ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| failure("Failed to count sessions", e))?;

        let active: i64 = row.try_get("active").map_err(|e| column("active", e))?;
        Ok(active as usize)
    }
}

fn failure(context: &str, err: sqlx::Error) -> DomainError {
    tracing::error!(error = %err, "{}", context);
    DomainError::storage(context, err)
}

fn column(name: &str, err: sqlx::Error) -> DomainError {
    DomainError::storage(&format!("Failed to read column {}", name), err)
}
