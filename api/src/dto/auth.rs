use serde::{Deserialize, Serialize};
use validator::Validate;

use cp_core::domain::entities::token::TokenPair;
use cp_core::domain::entities::user::UserPublic;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// bcrypt only reads the first 72 bytes
    #[validate(length(min = 8, max = 72))]
    pub password: String,
}

#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Body fallback for clients that cannot send the refresh cookie
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserPublic>,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl AuthResponse {
    pub fn new(user: Option<UserPublic>, tokens: &TokenPair) -> Self {
        Self {
            user,
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            token_type: "Bearer".to_string(),
            expires_in: tokens.access_expires_in,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
    pub revoked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutAllResponse {
    pub message: String,
    pub revoked: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub active_sessions: usize,
}
