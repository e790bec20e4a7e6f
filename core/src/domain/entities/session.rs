//! Refresh token records and the per-user session collection.
//!
//! A [`UserSession`] is the ordered list of refresh tokens issued to one
//! user. Records are appended on every sign-in and rotation, invalidated at
//! most once, and pruned once they are invalidated or expired.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-side record of one issued refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Unique identifier embedded in the signed token
    pub jti: String,

    /// Issuance time
    pub created_at: DateTime<Utc>,

    /// Hard expiry, independent of the invalidation flag
    pub expires_at: DateTime<Utc>,

    invalidated: bool,
}

impl RefreshTokenRecord {
    /// Creates an active record
    pub fn new(jti: impl Into<String>, created_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            jti: jti.into(),
            created_at,
            expires_at,
            invalidated: false,
        }
    }

    /// Rebuilds a record loaded from storage
    pub fn restore(
        jti: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        invalidated: bool,
    ) -> Self {
        Self {
            jti: jti.into(),
            created_at,
            expires_at,
            invalidated,
        }
    }

    /// Whether the record was consumed or revoked
    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Whether the record has passed its expiry at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Usable for rotation: not invalidated and not expired
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.invalidated && !self.is_expired(now)
    }

    /// Marks the record invalidated. Returns `true` if the flag changed.
    ///
    /// There is deliberately no inverse operation.
    pub fn invalidate(&mut self) -> bool {
        let changed = !self.invalidated;
        self.invalidated = true;
        changed
    }
}

/// Result of an atomic rotation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The presented record was consumed and the replacement stored
    Rotated,
    /// No active record matched the presented jti; nothing was changed
    NoActiveRecord,
    /// The owning user does not exist
    UserNotFound,
}

/// Ordered collection of refresh token records owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    /// Owning user
    pub user_id: Uuid,

    refresh_tokens: Vec<RefreshTokenRecord>,
}

impl UserSession {
    /// Creates an empty session collection
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            refresh_tokens: Vec::new(),
        }
    }

    /// Rebuilds a collection from stored records, in issuance order
    pub fn from_records(user_id: Uuid, refresh_tokens: Vec<RefreshTokenRecord>) -> Self {
        Self {
            user_id,
            refresh_tokens,
        }
    }

    /// All records in issuance order
    pub fn records(&self) -> &[RefreshTokenRecord] {
        &self.refresh_tokens
    }

    /// Appends a newly issued record
    pub fn push(&mut self, record: RefreshTokenRecord) {
        self.refresh_tokens.push(record);
    }

    /// Finds the active record for `jti`
    pub fn find_active(&self, jti: &str, now: DateTime<Utc>) -> Option<&RefreshTokenRecord> {
        self.refresh_tokens
            .iter()
            .find(|record| record.jti == jti && record.is_active(now))
    }

    /// Number of records usable for rotation
    pub fn active_count(&self, now: DateTime<Utc>) -> usize {
        self.refresh_tokens
            .iter()
            .filter(|record| record.is_active(now))
            .count()
    }

    /// Invalidates the record for `jti`. Returns `true` if a record changed.
    pub fn invalidate(&mut self, jti: &str) -> bool {
        self.refresh_tokens
            .iter_mut()
            .find(|record| record.jti == jti)
            .map(RefreshTokenRecord::invalidate)
            .unwrap_or(false)
    }

    /// Invalidates every record. Returns how many changed.
    pub fn invalidate_all(&mut self) -> usize {
        self.refresh_tokens
            .iter_mut()
            .map(RefreshTokenRecord::invalidate)
            .filter(|changed| *changed)
            .count()
    }

    /// Drops invalidated and expired records. Returns how many were removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.refresh_tokens.len();
        self.refresh_tokens.retain(|record| record.is_active(now));
        before - self.refresh_tokens.len()
    }

    /// Consumes the active record for `jti` and appends `replacement`.
    ///
    /// This is the compare-and-set at the heart of rotation: it either
    /// consumes exactly one active record, stores the replacement and prunes,
    /// or leaves the collection untouched and reports `NoActiveRecord`.
    pub fn rotate(
        &mut self,
        jti: &str,
        replacement: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> RotationOutcome {
        let Some(current) = self
            .refresh_tokens
            .iter_mut()
            .find(|record| record.jti == jti && record.is_active(now))
        else {
            return RotationOutcome::NoActiveRecord;
        };

        current.invalidate();
        self.refresh_tokens.push(replacement);
        self.prune(now);
        RotationOutcome::Rotated
    }
}
