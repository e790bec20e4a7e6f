//! Request and response bodies

pub mod auth;

pub use auth::{
    AuthResponse, LoginRequest, LogoutAllResponse, LogoutResponse, RefreshTokenRequest,
    SessionsResponse, SignupRequest,
};
