//! Sign-up and login through the HTTP surface

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

use cp_api::create_app;
use common::{cookie, login_request, signup_request, state, PASSWORD};

#[actix_web::test]
async fn test_health_check() {
    let app = test::init_service(create_app(state())).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_unknown_route_returns_json_404() {
    let app = test::init_service(create_app(state())).await;

    let req = test::TestRequest::get().uri("/api/v1/nope").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_FOUND");
}

#[actix_web::test]
async fn test_signup_returns_tokens_and_cookies() {
    let app = test::init_service(create_app(state())).await;

    let resp = test::call_service(&app, signup_request("new@example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let access = cookie(&resp, "token").expect("access cookie");
    let refresh = cookie(&resp, "refreshToken").expect("refresh cookie");
    assert_eq!(access.http_only(), Some(true));
    assert_eq!(refresh.http_only(), Some(true));
    assert_eq!(refresh.path(), Some("/"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "new@example.com");
    assert_eq!(body["user"]["auth_provider"], "password");
    assert!(body["user"].get("password_hash").is_none());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["access_token"], access.value());
    assert_eq!(body["refresh_token"], refresh.value());
    assert!(body["expires_in"].as_i64().unwrap() > 0);
}

#[actix_web::test]
async fn test_signup_normalizes_email() {
    let app = test::init_service(create_app(state())).await;

    let resp = test::call_service(&app, signup_request("Mixed@Example.COM").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(&app, login_request("mixed@example.com", PASSWORD).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_duplicate_signup_conflicts() {
    let app = test::init_service(create_app(state())).await;

    let resp = test::call_service(&app, signup_request("dup@example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(&app, signup_request("dup@example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "CONFLICT");
}

#[actix_web::test]
async fn test_signup_validation_errors() {
    let app = test::init_service(create_app(state())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({ "email": "not-an-email", "name": "", "password": "short" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"].get("email").is_some());
    assert!(body["details"].get("password").is_some());
}

#[actix_web::test]
async fn test_malformed_json_is_a_validation_error() {
    let app = test::init_service(create_app(state())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_login_with_wrong_password() {
    let app = test::init_service(create_app(state())).await;
    test::call_service(&app, signup_request("user@example.com").to_request()).await;

    let resp = test::call_service(&app, login_request("user@example.com", "wrong password").to_request()).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(cookie(&resp, "refreshToken").is_none());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
}

#[actix_web::test]
async fn test_login_with_unknown_email_matches_wrong_password() {
    let app = test::init_service(create_app(state())).await;

    let resp = test::call_service(&app, login_request("ghost@example.com", PASSWORD).to_request()).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
}

#[actix_web::test]
async fn test_login_starts_a_new_session() {
    let app = test::init_service(create_app(state())).await;
    let resp = test::call_service(&app, signup_request("user@example.com").to_request()).await;
    let first_refresh = cookie(&resp, "refreshToken").unwrap();

    let resp = test::call_service(&app, login_request("user@example.com", PASSWORD).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let second_refresh = cookie(&resp, "refreshToken").unwrap();
    assert_ne!(first_refresh.value(), second_refresh.value());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "user@example.com");

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/sessions")
        .insert_header(("Authorization", format!("Bearer {}", body["access_token"].as_str().unwrap())))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["active_sessions"], 2);
}
