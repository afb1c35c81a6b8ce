use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, Path};
use crate::models::DeviceState;

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub authorized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub state: DeviceState,
}

/// POST /licenses/{id}/validate - May this device use the license right now?
pub async fn validate_device(
    State(state): State<AppState>,
    Path(license_id): Path<String>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>> {
    let validation = state.service.validate(&license_id, &req.device_id)?;

    // Unknown licenses report the same state as an unknown device
    Ok(Json(ValidateResponse {
        authorized: validation.authorized,
        expires_at: validation.expires_at,
        state: validation.state.unwrap_or(DeviceState::Unknown),
    }))
}
