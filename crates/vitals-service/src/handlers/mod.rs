//! Simulated endpoint handlers.
//!
//! Every handler runs the same pipeline:
//! 1. count the request (`custom_requests_total`), success or not
//! 2. sample the endpoint's plan and suspend for its delay
//! 3. answer with either the failure body (and count it in
//!    `api_errors_total`) or the success body (and observe the measured
//!    elapsed time in `custom_response_time_seconds`)
//!
//! A simulated failure is an ordinary response, never an `Err`.

pub mod payload;

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio::time::Instant;

use vitals_core::profile::{Detail, Endpoint};

use crate::app_state::AppState;
use crate::obs::metrics::{
    MetricsSink, ACTIVE_USERS, API_ERRORS_TOTAL, REQUESTS_TOTAL, RESPONSE_TIME_SECONDS,
};

/// Raw query pairs. Repeated keys are allowed; the last `q` wins.
type QueryPairs = Vec<(String, String)>;

fn last_q(pairs: &QueryPairs) -> Option<&str> {
    pairs.iter().rev().find(|(k, _)| k == "q").map(|(_, v)| v.as_str())
}

pub async fn home(State(state): State<AppState>, method: Method) -> Response {
    serve(&state, Endpoint::Home, &method, None).await
}

pub async fn user_profile(State(state): State<AppState>, method: Method) -> Response {
    serve(&state, Endpoint::UserProfile, &method, None).await
}

pub async fn search(
    State(state): State<AppState>,
    method: Method,
    Query(pairs): Query<QueryPairs>,
) -> Response {
    serve(&state, Endpoint::Search, &method, last_q(&pairs)).await
}

pub async fn heavy_computation(State(state): State<AppState>, method: Method) -> Response {
    serve(&state, Endpoint::HeavyComputation, &method, None).await
}

pub async fn file_upload(State(state): State<AppState>, method: Method) -> Response {
    serve(&state, Endpoint::FileUpload, &method, None).await
}

pub async fn analytics(State(state): State<AppState>, method: Method) -> Response {
    serve(&state, Endpoint::Analytics, &method, None).await
}

pub async fn health(State(state): State<AppState>, method: Method) -> Response {
    serve(&state, Endpoint::Health, &method, None).await
}

pub async fn load_test(State(state): State<AppState>, method: Method) -> Response {
    serve(&state, Endpoint::LoadTest, &method, None).await
}

async fn serve(
    state: &AppState,
    endpoint: Endpoint,
    method: &Method,
    query: Option<&str>,
) -> Response {
    let started = Instant::now();
    let metrics = state.metrics();
    let view = endpoint.name();

    metrics.increment_counter(
        REQUESTS_TOTAL,
        &[("view_name", view), ("method", method.as_str())],
    );

    let plan = state.sample(endpoint, query);
    if !plan.delay.is_zero() {
        tokio::time::sleep(plan.delay).await;
    }

    let (status, body) = match plan.failure {
        Some(kind) => {
            metrics.increment_counter(
                API_ERRORS_TOTAL,
                &[("view_name", view), ("error_type", kind.as_str())],
            );
            let status =
                StatusCode::from_u16(kind.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, payload::failure(kind))
        }
        None => {
            if let Detail::Home { gauge_users, .. } = plan.detail {
                metrics.set_gauge(ACTIVE_USERS, i64::from(gauge_users));
            }
            let body = payload::success(&plan.detail, started.elapsed());
            metrics.observe_histogram(
                RESPONSE_TIME_SECONDS,
                &[("view_name", view)],
                started.elapsed(),
            );
            (StatusCode::OK, body)
        }
    };

    tracing::debug!(
        endpoint = view,
        status = status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );

    (status, Json(body)).into_response()
}
