//! Axum router wiring.
//!
//! Simulated endpoints live under `/app`; the bare root also answers as
//! `home`. `/metrics` exposes the registry.

use axum::{routing::get, Router};
use vitals_core::profile::Endpoint;

use crate::{app_state::AppState, handlers, ops};

/// Prefix every simulated endpoint is mounted under.
pub const APP_PREFIX: &str = "/app";

/// Full route of an endpoint, e.g. `/app/compute/`.
pub fn app_path(endpoint: Endpoint) -> String {
    format!("{APP_PREFIX}{}", endpoint.path())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route(&app_path(Endpoint::Home), get(handlers::home))
        .route(&app_path(Endpoint::UserProfile), get(handlers::user_profile))
        .route(&app_path(Endpoint::Search), get(handlers::search))
        .route(&app_path(Endpoint::HeavyComputation), get(handlers::heavy_computation))
        .route(&app_path(Endpoint::FileUpload), get(handlers::file_upload))
        .route(&app_path(Endpoint::Analytics), get(handlers::analytics))
        .route(&app_path(Endpoint::Health), get(handlers::health))
        .route(&app_path(Endpoint::LoadTest), get(handlers::load_test))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
