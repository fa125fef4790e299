//! Operational endpoint tests
//!
//! Exercises the public endpoints through the real router.

mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn health_check_returns_healthy() {
    let app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn liveness_probe_is_alive() {
    let app = TestApp::new();

    let response = app.get("/health/live").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn metrics_endpoint_serves_prometheus_text() {
    let app = TestApp::new();

    let response = app.get("/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("feed_server"));
}

#[tokio::test]
async fn protected_route_rejects_missing_token() {
    let app = TestApp::new();

    let response = app.get("/api/v1/users/@me").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
