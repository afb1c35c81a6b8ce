use axum::{Extension, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::middleware::IssuerContext;
use crate::models::Plan;

#[derive(Debug, Deserialize)]
pub struct IssueLicenseRequest {
    /// Purchase session id (or admin marker); retries with the same value
    /// return the license minted the first time
    pub source_ref: String,
    #[serde(default)]
    pub plan: Option<Plan>,
    /// Explicit duration for admin grants; mutually exclusive with `plan`
    #[serde(default)]
    pub duration_days: Option<i64>,
}

impl IssueLicenseRequest {
    fn days(&self) -> Result<i64> {
        match (self.plan, self.duration_days) {
            (Some(plan), None) => Ok(plan.days()),
            (None, Some(days)) => Ok(days),
            (Some(_), Some(_)) => Err(AppError::BadRequest(
                "Specify either plan or duration_days, not both".into(),
            )),
            (None, None) => Err(AppError::BadRequest(
                "One of plan or duration_days is required".into(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IssueLicenseResponse {
    pub license_id: String,
    pub activation_url: String,
    pub expires_at: i64,
    /// False when `source_ref` was already bound to this license
    pub created: bool,
}

/// POST /issue/licenses - Mint (or fetch) the license for a purchase
pub async fn issue_license(
    State(state): State<AppState>,
    Extension(ctx): Extension<IssuerContext>,
    Json(req): Json<IssueLicenseRequest>,
) -> Result<(StatusCode, Json<IssueLicenseResponse>)> {
    let days = req.days()?;
    let issued = state.service.create_license(&req.source_ref, days)?;

    tracing::debug!(
        license_id = %issued.license.id,
        issuer = %ctx.key_fingerprint,
        created = issued.created,
        "Issue request served"
    );

    let status = if issued.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(IssueLicenseResponse {
            activation_url: state.activation_url(&issued.license.id),
            license_id: issued.license.id,
            expires_at: issued.license.expires_at,
            created: issued.created,
        }),
    ))
}
