use axum::extract::State;
use serde::Serialize;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, LicenseId};

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    Active,
    Expired,
}

/// Device ids are never included; they act as bearer secrets for validation.
#[derive(Debug, Serialize)]
pub struct LicenseStatusResponse {
    pub status: LicenseStatus,
    pub created_at: i64,
    pub expires_at: i64,
    pub device_count: usize,
    pub max_devices: usize,
    pub has_active_device: bool,
}

/// GET /licenses/{id} - Public license status for the activation screen
pub async fn get_license_status(
    State(state): State<AppState>,
    LicenseId(license_id): LicenseId,
) -> Result<Json<LicenseStatusResponse>> {
    let summary = state.service.license_status(&license_id)?;

    let status = if summary.expired {
        LicenseStatus::Expired
    } else {
        LicenseStatus::Active
    };

    Ok(Json(LicenseStatusResponse {
        status,
        created_at: summary.created_at,
        expires_at: summary.expires_at,
        device_count: summary.device_count,
        max_devices: summary.max_devices,
        has_active_device: summary.has_active_device,
    }))
}
