//! User entity representing a registered CareerPilot account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the account authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Email and password
    Password,
    /// Google OAuth
    Google,
    /// GitHub OAuth
    Github,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Password => "password",
            AuthProvider::Google => "google",
            AuthProvider::Github => "github",
        }
    }
}

impl std::fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "password" => Ok(AuthProvider::Password),
            "google" => Ok(AuthProvider::Google),
            "github" => Ok(AuthProvider::Github),
            _ => Err(format!("Unknown auth provider: {}", s)),
        }
    }
}

/// User entity representing a registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Lower-cased email, unique across users
    pub email: String,

    /// Display name
    pub name: String,

    /// bcrypt hash; `None` for accounts created through an external provider
    pub password_hash: Option<String>,

    /// Provider the account was created with
    pub auth_provider: AuthProvider,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,

    /// Timestamp of the user's last sign-in
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a password-authenticated user
    pub fn new(email: impl Into<String>, name: impl Into<String>, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(&email.into()),
            name: name.into(),
            password_hash: Some(password_hash),
            auth_provider: AuthProvider::Password,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Creates a user that signs in through an external identity provider
    pub fn new_external(
        email: impl Into<String>,
        name: impl Into<String>,
        provider: AuthProvider,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(&email.into()),
            name: name.into(),
            password_hash: None,
            auth_provider: provider,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Records a successful sign-in
    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login_at = Some(at);
        self.updated_at = at;
    }
}

/// Normalizes an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Public projection of a user, safe to return from the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: String,
    pub email: String,
    pub name: String,
    pub auth_provider: AuthProvider,
    pub created_at: String,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            auth_provider: user.auth_provider,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        UserPublic::from(&user)
    }
}
