//! Authentication API tests
//!
//! Account endpoints need Postgres; without one configured they answer 503.
//! The middleware is exercised against the protected routes.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use pulsechat::shared::UserId;
use serde_json::json;

use crate::assert_contains;
use crate::common::{auth_header, generate_test_token, test_app};

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_signup_without_database_is_unavailable() {
    let app = test_app().await;

    let (status, body) = app
        .request_json(json_post(
            "/api/auth/signup",
            json!({ "fullName": "Ada", "email": "ada@example.com", "password": "secret1" }),
        ))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Database not configured");
}

#[tokio::test]
async fn test_login_without_database_is_unavailable() {
    let app = test_app().await;

    let (status, _) = app
        .request_json(json_post(
            "/api/auth/login",
            json!({ "email": "ada@example.com", "password": "secret1" }),
        ))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let app = test_app().await;

    let response = app
        .request(Request::post("/api/auth/logout").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert_contains!(cookie, "jwt=;");
    assert_contains!(cookie, "Max-Age=0");
}

#[tokio::test]
async fn test_check_without_token() {
    let app = test_app().await;

    let (status, body) = app
        .request_json(Request::get("/api/auth/check").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized - No Token Provided");
}

#[tokio::test]
async fn test_check_with_invalid_token() {
    let app = test_app().await;

    let (status, body) = app
        .request_json(
            Request::get("/api/auth/check")
                .header(header::AUTHORIZATION, auth_header("not-a-token"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized - Invalid Token");
}

#[tokio::test]
async fn test_check_with_valid_token_needs_database() {
    let app = test_app().await;
    let token = generate_test_token(UserId::new());

    let (status, _) = app
        .request_json(
            Request::get("/api/auth/check")
                .header(header::AUTHORIZATION, auth_header(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
