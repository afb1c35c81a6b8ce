mod activate;
mod license;
mod validate;

pub use activate::*;
pub use license::*;
pub use validate::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/licenses/{id}", get(get_license_status))
        .route("/licenses/{id}/activate", post(activate_license))
        // Read-only; unknown licenses answer authorized=false rather than 404
        .route("/licenses/{id}/validate", post(validate_device))
}
