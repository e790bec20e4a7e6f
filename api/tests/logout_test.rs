//! Logout of a single session and of every session

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::Value;

use cp_api::create_app;
use common::{cookie, login_request, refresh_request, signup_request, state, PASSWORD};

#[actix_web::test]
async fn test_logout_revokes_presented_session() {
    let app = test::init_service(create_app(state())).await;
    let resp = test::call_service(&app, signup_request("user@example.com").to_request()).await;
    let refresh = cookie(&resp, "refreshToken").unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .cookie(refresh.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(cookie(&resp, "token").unwrap().value(), "");
    assert_eq!(cookie(&resp, "refreshToken").unwrap().value(), "");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["revoked"], true);

    let resp = test::call_service(&app, refresh_request(refresh.value()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_logout_leaves_other_sessions_alone() {
    let app = test::init_service(create_app(state())).await;
    let resp = test::call_service(&app, signup_request("user@example.com").to_request()).await;
    let first = cookie(&resp, "refreshToken").unwrap();
    let resp = test::call_service(&app, login_request("user@example.com", PASSWORD).to_request()).await;
    let second = cookie(&resp, "refreshToken").unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .cookie(first)
        .to_request();
    test::call_service(&app, req).await;

    let resp = test::call_service(&app, refresh_request(second.value()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_logout_without_token() {
    let app = test::init_service(create_app(state())).await;

    let req = test::TestRequest::post().uri("/api/v1/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(cookie(&resp, "refreshToken").unwrap().value(), "");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["revoked"], false);
}

#[actix_web::test]
async fn test_logout_with_garbage_token() {
    let app = test::init_service(create_app(state())).await;

    let resp = test::call_service(
        &app,
        refresh_request("garbage")
            .uri("/api/v1/auth/logout")
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["revoked"], false);
}

#[actix_web::test]
async fn test_logout_all_requires_access_token() {
    let app = test::init_service(create_app(state())).await;

    let req = test::TestRequest::post().uri("/api/v1/auth/logout-all").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[actix_web::test]
async fn test_logout_all_revokes_every_session() {
    let app = test::init_service(create_app(state())).await;
    let resp = test::call_service(&app, signup_request("user@example.com").to_request()).await;
    let first = cookie(&resp, "refreshToken").unwrap();
    let resp = test::call_service(&app, login_request("user@example.com", PASSWORD).to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    let access = body["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout-all")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(cookie(&resp, "refreshToken").unwrap().value(), "");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["revoked"], 2);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/sessions")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["active_sessions"], 0);

    let resp = test::call_service(&app, refresh_request(first.value()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
