//! Error responses are always JSON and never leak internals.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

#[path = "../common/mod.rs"]
mod common;
use common::*;

#[tokio::test]
async fn test_malformed_json_body_returns_json_error() {
    let t = test_app();
    let id = issue_test_license(&t.state, "sess_1", 10);

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/licenses/{}/activate", id))
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).expect("error body should be JSON");
    assert_eq!(json["error"], "Bad request");
    assert!(json["details"].is_string());
}

#[tokio::test]
async fn test_missing_device_id_field_returns_json_error() {
    let t = test_app();
    let id = issue_test_license(&t.state, "sess_1", 10);

    let (status, json) = post_json(
        &t.app,
        &format!("/licenses/{}/validate", id),
        json!({ "legal_accepted": true }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Bad request");
}

#[tokio::test]
async fn test_missing_content_type_returns_json_error() {
    let t = test_app();
    let id = issue_test_license(&t.state, "sess_1", 10);

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/licenses/{}/validate", id))
                .body(Body::from(r#"{"device_id":"dev-A"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    // Every body rejection is reported as a plain bad request
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).expect("error body should be JSON");
    assert_eq!(json["error"], "Bad request");
}
