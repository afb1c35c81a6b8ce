use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, LicenseId};

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub device_id: String,
    /// Must be true on every activation, including re-activations
    #[serde(default)]
    pub legal_accepted: bool,
}

#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    pub status: &'static str,
    pub expires_at: i64,
    pub newly_registered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
}

/// POST /licenses/{id}/activate - Bind this device and make it the active one
pub async fn activate_license(
    State(state): State<AppState>,
    LicenseId(license_id): LicenseId,
    Json(req): Json<ActivateRequest>,
) -> Result<Json<ActivateResponse>> {
    let activation = state
        .service
        .activate(&license_id, &req.device_id, req.legal_accepted)?;

    Ok(Json(ActivateResponse {
        status: "active",
        expires_at: activation.expires_at,
        newly_registered: activation.newly_registered,
        content_url: state.content_url.clone(),
    }))
}
