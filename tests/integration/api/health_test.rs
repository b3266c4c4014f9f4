//! Health and fallback route tests

use axum::body::Body;
use axum::http::{Request, StatusCode};

use crate::common::test_app;

#[tokio::test]
async fn test_health_reports_environment() {
    let app = test_app().await;

    let (status, body) = app
        .request_json(Request::get("/api/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["environment"], "development");
    assert_eq!(body["port"], 5001);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = test_app().await;

    let (status, body) = app
        .request_json(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_cors_allows_dev_origin_with_credentials() {
    let app = test_app().await;

    let response = app
        .request(
            Request::get("/api/health")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        headers.get("access-control-allow-credentials").unwrap(),
        "true"
    );
}
