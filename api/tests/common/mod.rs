//! Shared setup for API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::{test, web};
use serde_json::json;

use cp_api::AppState;
use cp_core::repositories::{InMemoryUserRepository, UserRepository};
use cp_core::services::auth::AuthServiceConfig;
use cp_core::services::token::{TokenIssuer, TokenIssuerConfig};
use cp_shared::CookieConfig;

pub const ACCESS_SECRET: &str = "test-access-secret";
pub const REFRESH_SECRET: &str = "test-refresh-secret";
pub const PASSWORD: &str = "correct horse battery";

/// Issuer sharing the app's secrets, for minting tokens in tests
pub fn issuer() -> TokenIssuer {
    TokenIssuer::new(TokenIssuerConfig::new(ACCESS_SECRET, REFRESH_SECRET)).unwrap()
}

pub fn state() -> web::Data<AppState> {
    let repository: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
    web::Data::new(AppState::new(
        repository,
        issuer(),
        AuthServiceConfig::default().with_password_hash_cost(4),
        CookieConfig::default(),
    ))
}

pub fn signup_request(email: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({ "email": email, "name": "Test User", "password": PASSWORD }))
}

pub fn login_request(email: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": email, "password": password }))
}

pub fn refresh_request(refresh_token: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .cookie(Cookie::new("refreshToken", refresh_token.to_string()))
}

/// Value of a cookie set by the response
pub fn cookie<B>(response: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}
