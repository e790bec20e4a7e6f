//! Inputs and results of the authentication service

use serde::{Deserialize, Serialize};

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::{AuthProvider, UserPublic};

/// New account with email and password
#[derive(Clone)]
pub struct SignupInput {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Email and password sign-in
#[derive(Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Identity asserted by an external provider after a completed OAuth flow
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub provider: AuthProvider,
    pub email: String,
    pub name: String,
}

/// A signed-in user and their new token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedSession {
    pub user: UserPublic,
    pub tokens: TokenPair,
}
