//! devicelock - time-bounded licenses bound to a small set of devices
//!
//! A license may be installed on at most `MAX_DEVICES` devices and used on
//! exactly one of them at a time. This library holds the license state
//! machine, its SQLite and in-memory stores, and the HTTP gateway in front of it.

pub mod clock;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod id;
pub mod middleware;
pub mod models;
pub mod registry;
pub mod service;
pub mod store;
pub mod util;

use axum::Router;

use crate::db::AppState;

/// Build the full application router for `state`.
///
/// Issue routes are mounted only when issuer keys are configured.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new().merge(handlers::public::router());

    if !state.issuer_keys.is_empty() {
        router = router.merge(handlers::issue::router(state.clone()));
    }

    router.with_state(state)
}
