//! Integration tests for the health endpoint.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use stockroom_integration_tests::TestApp;

#[tokio::test]
async fn health_reports_ok_when_store_is_reachable() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "reachable");
    assert!(body.get("checked_at").is_some());
}

#[tokio::test]
async fn health_reports_degraded_when_store_is_unreachable() {
    let app = TestApp::new().await;
    app.pool().close().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "unreachable");
}
