use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors produced by the license core (store, registry, service).
#[derive(Error, Debug)]
pub enum LicenseError {
    #[error("License not found")]
    NotFound,

    #[error("Source reference already bound to license {existing_id}")]
    DuplicateSourceRef { existing_id: String },

    #[error("License id already exists")]
    DuplicateId,

    #[error("License expired")]
    Expired,

    #[error("Device limit reached ({limit}/{limit})")]
    DeviceLimitExceeded { limit: usize },

    #[error("Legal terms must be accepted before activation")]
    LegalConsentRequired,

    #[error("Invalid plan duration: {0} days")]
    InvalidDuration(i64),

    #[error("Source reference must not be empty")]
    InvalidSourceRef,

    #[error("Invalid device id")]
    InvalidDeviceId,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LicenseError {
    /// Stable machine-readable code returned to clients.
    pub fn code(&self) -> &'static str {
        match self {
            LicenseError::NotFound => "license_not_found",
            LicenseError::DuplicateSourceRef { .. } => "duplicate_source_ref",
            LicenseError::DuplicateId => "duplicate_license_id",
            LicenseError::Expired => "license_expired",
            LicenseError::DeviceLimitExceeded { .. } => "device_limit_exceeded",
            LicenseError::LegalConsentRequired => "legal_consent_required",
            LicenseError::InvalidDuration(_) => "invalid_duration",
            LicenseError::InvalidSourceRef => "invalid_source_ref",
            LicenseError::InvalidDeviceId => "invalid_device_id",
            LicenseError::Database(_) | LicenseError::Pool(_) | LicenseError::Internal(_) => {
                "internal_error"
            }
        }
    }

    /// True for failures of the storage layer rather than policy decisions.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            LicenseError::Database(_) | LicenseError::Pool(_) | LicenseError::Internal(_)
        )
    }
}

pub type LicenseResult<T> = std::result::Result<T, LicenseError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    License(#[from] LicenseError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::License(LicenseError::Pool(e))
    }
}

fn license_error_parts(e: &LicenseError) -> (StatusCode, &'static str, Option<String>) {
    match e {
        LicenseError::NotFound => (StatusCode::NOT_FOUND, "Invalid link", None),
        LicenseError::Expired => (
            StatusCode::FORBIDDEN,
            "License expired",
            Some("Renew or purchase a new license".into()),
        ),
        LicenseError::DeviceLimitExceeded { limit } => (
            StatusCode::FORBIDDEN,
            "Device limit reached",
            Some(format!(
                "This license is already installed on {} devices. Buy another license for this device.",
                limit
            )),
        ),
        LicenseError::LegalConsentRequired => (
            StatusCode::FORBIDDEN,
            "Legal terms not accepted",
            Some("Accept the legal disclaimer to activate".into()),
        ),
        LicenseError::DuplicateSourceRef { .. } | LicenseError::DuplicateId => {
            (StatusCode::CONFLICT, "Conflict", Some(e.to_string()))
        }
        LicenseError::InvalidDuration(_)
        | LicenseError::InvalidSourceRef
        | LicenseError::InvalidDeviceId => {
            (StatusCode::BAD_REQUEST, "Bad request", Some(e.to_string()))
        }
        LicenseError::Database(_) | LicenseError::Pool(_) | LicenseError::Internal(_) => {
            tracing::error!("Storage error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, code, details) = match &self {
            AppError::License(e) => {
                let (status, error, details) = license_error_parts(e);
                (status, error, Some(e.code()), details)
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", None, Some(msg.clone()))
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None, None),
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid JSON", None, Some(e.to_string()))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None, None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            code,
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
