use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::crypto::hash_secret;
use crate::db::AppState;
use crate::error::AppError;
use crate::util::extract_bearer_token;

/// Identifies which issuer key authenticated a request, for logging.
#[derive(Debug, Clone)]
pub struct IssuerContext {
    /// First characters of the key's hash; never the key itself
    pub key_fingerprint: String,
}

const FINGERPRINT_LEN: usize = 12;

/// Require a configured issuer key as a bearer token.
pub async fn issuer_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;

    if !state.issuer_keys.verify(token) {
        tracing::warn!(
            path = %request.uri().path(),
            "Rejected issuer request with unknown key"
        );
        return Err(AppError::Unauthorized);
    }

    let mut key_fingerprint = hash_secret(token);
    key_fingerprint.truncate(FINGERPRINT_LEN);

    request
        .extensions_mut()
        .insert(IssuerContext { key_fingerprint });
    Ok(next.run(request).await)
}
