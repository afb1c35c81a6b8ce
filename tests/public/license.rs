//! Tests for GET /licenses/{id} and GET /health.

use axum::http::StatusCode;
use serde_json::json;

#[path = "../common/mod.rs"]
mod common;
use common::*;

#[tokio::test]
async fn test_health() {
    let t = test_app();
    let (status, json) = get_json(&t.app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_license_status_fresh_license() {
    let t = test_app();
    let id = issue_test_license(&t.state, "sess_1", 28);

    let (status, json) = get_json(&t.app, &format!("/licenses/{}", id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "active");
    assert_eq!(json["created_at"], T0);
    assert_eq!(json["expires_at"], T0 + 28 * ONE_DAY);
    assert_eq!(json["device_count"], 0);
    assert_eq!(json["max_devices"], 2);
    assert_eq!(json["has_active_device"], false);
}

#[tokio::test]
async fn test_license_status_never_lists_device_ids() {
    let t = test_app();
    let id = issue_test_license(&t.state, "sess_1", 10);
    post_json(
        &t.app,
        &format!("/licenses/{}/activate", id),
        json!({ "device_id": "secret-device-id", "legal_accepted": true }),
    )
    .await;

    let (status, json) = get_json(&t.app, &format!("/licenses/{}", id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["device_count"], 1);
    assert_eq!(json["has_active_device"], true);
    assert!(
        !json.to_string().contains("secret-device-id"),
        "device ids must not be exposed: {}",
        json
    );
    assert!(json.get("source_ref").is_none());
}

#[tokio::test]
async fn test_license_status_expired() {
    let t = test_app();
    let id = issue_test_license(&t.state, "sess_1", 10);
    t.clock.advance_days(30);

    let (status, json) = get_json(&t.app, &format!("/licenses/{}", id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "expired");
}

#[tokio::test]
async fn test_license_status_unknown() {
    let t = test_app();
    let (status, json) =
        get_json(&t.app, "/licenses/lk_0123456789abcdef0123456789abcdef").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "license_not_found");
}
