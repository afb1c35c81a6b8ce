mod licenses;

pub use licenses::*;

use axum::{Router, middleware, routing::post};

use crate::db::AppState;
use crate::middleware::issuer_auth;

/// Routes for the checkout collaborator and admins. Only mounted when at
/// least one issuer key is configured.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/issue/licenses", post(issue_license))
        .layer(middleware::from_fn_with_state(state, issuer_auth))
}
