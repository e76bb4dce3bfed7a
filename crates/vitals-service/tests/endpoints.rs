//! In-process router tests for the simulated endpoints.
//!
//! Time is paused, so simulated delays auto-advance the clock instead of
//! actually sleeping.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use vitals_service::app_state::AppState;
use vitals_service::config::{ServiceConfig, ServiceSection};
use vitals_service::obs::metrics::{
    ACTIVE_USERS, API_ERRORS_TOTAL, REQUESTS_TOTAL, RESPONSE_TIME_SECONDS,
};
use vitals_service::obs::MetricsRegistry;
use vitals_service::router::build_router;

fn setup(seed: u64) -> (Router, Arc<MetricsRegistry>) {
    let cfg = ServiceConfig {
        version: 1,
        service: ServiceSection {
            listen: "127.0.0.1:0".into(),
            seed: Some(seed),
        },
    };
    let state = AppState::new(cfg);
    let metrics = state.metrics();
    (build_router(state), metrics)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn requests(m: &MetricsRegistry, view: &str) -> u64 {
    m.counter_value(REQUESTS_TOTAL, &[("view_name", view), ("method", "GET")])
}

fn observations(m: &MetricsRegistry, view: &str) -> u64 {
    m.histogram_count(RESPONSE_TIME_SECONDS, &[("view_name", view)])
}

fn errors(m: &MetricsRegistry, view: &str, kind: &str) -> u64 {
    m.counter_value(API_ERRORS_TOTAL, &[("view_name", view), ("error_type", kind)])
}

#[tokio::test(start_paused = true)]
async fn every_success_counts_once_and_observes_once() {
    let (app, m) = setup(1);
    let cases = [
        ("/app/", "home"),
        ("/app/analytics/", "analytics"),
        ("/app/health/", "health"),
        ("/app/loadtest/", "load_test"),
        ("/app/search/?q=abc", "search"),
    ];

    for (uri, view) in cases {
        for n in 1..=3 {
            let (status, _) = get(&app, uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(requests(&m, view), n, "{uri}");
            assert_eq!(observations(&m, view), n, "{uri}");
        }
    }
}

#[tokio::test(start_paused = true)]
async fn root_path_is_home() {
    let (app, m) = setup(2);
    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to Vitals Monitoring");
    let users = body["active_users"].as_u64().unwrap();
    assert!((10..=50).contains(&users));
    assert_eq!(requests(&m, "home"), 1);

    let gauge = m.gauge_value(ACTIVE_USERS).unwrap();
    assert!((10..=50).contains(&gauge));
}

#[tokio::test(start_paused = true)]
async fn search_error_query_is_rejected() {
    let (app, m) = setup(3);
    for n in 1..=5 {
        let (status, body) = get(&app, "/app/search/?q=error123").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid search query");
        assert_eq!(errors(&m, "search", "invalid_query"), n);
    }
    let (status, _) = get(&app, "/app/search/?q=ERROR").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(requests(&m, "search"), 6);
    assert_eq!(observations(&m, "search"), 0);
}

#[tokio::test(start_paused = true)]
async fn search_defaults_query_and_lists_results() {
    let (app, _) = setup(4);
    let (status, body) = get(&app, "/app/search/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "default");

    let results = body["results"].as_array().unwrap();
    assert_eq!(body["total_results"].as_u64().unwrap() as usize, results.len());
    assert!(results.len() <= 10);
    for r in results {
        let score = r["score"].as_f64().unwrap();
        assert!((0.1..=1.0).contains(&score));
    }
    // 7 chars * 0.02 + uniform(0.05, 0.3)
    let t = body["search_time"].as_f64().unwrap();
    assert!((0.18..0.45).contains(&t), "search_time={t}");
}

#[tokio::test(start_paused = true)]
async fn search_repeated_query_keeps_last_value() {
    let (app, m) = setup(6);
    let (status, body) = get(&app, "/app/search/?q=error1&q=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "abc");
    assert_eq!(requests(&m, "search"), 1);

    let (status, body) = get(&app, "/app/search/?q=a&q=error9").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid search query");
    assert_eq!(requests(&m, "search"), 2);
    assert_eq!(errors(&m, "search", "invalid_query"), 1);
}

#[tokio::test(start_paused = true)]
async fn failing_endpoints_split_between_errors_and_histogram() {
    let (app, m) = setup(5);
    let cases = [
        ("/app/user/profile/", "user_profile", "database_error", StatusCode::INTERNAL_SERVER_ERROR),
        ("/app/compute/", "heavy_computation", "timeout", StatusCode::REQUEST_TIMEOUT),
        ("/app/upload/", "file_upload", "file_too_large", StatusCode::PAYLOAD_TOO_LARGE),
    ];

    for (uri, view, kind, fail_status) in cases {
        let total = 60;
        let mut failed = 0;
        for _ in 0..total {
            let (status, body) = get(&app, uri).await;
            if status == StatusCode::OK {
                assert!(body.get("error").is_none());
            } else {
                assert_eq!(status, fail_status, "{uri}");
                assert!(body["error"].is_string());
                failed += 1;
            }
        }
        assert_eq!(requests(&m, view), total, "{uri}");
        assert_eq!(errors(&m, view, kind), failed, "{uri}");
        assert_eq!(observations(&m, view), total - failed, "{uri}");
    }
}

#[tokio::test(start_paused = true)]
async fn upload_size_decides_status() {
    let (app, _) = setup(6);
    for _ in 0..40 {
        let (status, body) = get(&app, "/app/upload/").await;
        if status == StatusCode::OK {
            let size = body["size_mb"].as_u64().unwrap();
            assert!((1..=80).contains(&size));
            assert_eq!(body["status"], "uploaded");
            let upload_time = body["upload_time"].as_f64().unwrap();
            assert!(upload_time >= size as f64 * 0.01 + 0.1 - 1e-3);
        } else {
            assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn computation_never_succeeds_past_threshold() {
    let (app, _) = setup(7);
    for _ in 0..40 {
        let (status, body) = get(&app, "/app/compute/").await;
        if status == StatusCode::OK {
            let t = body["computation_time"].as_f64().unwrap();
            assert!((0.5..=1.51).contains(&t), "computation_time={t}");
            assert_eq!(body["status"], "completed");
        } else {
            assert_eq!(body["error"], "Computation timed out");
        }
    }
}

#[tokio::test(start_paused = true)]
async fn histogram_records_measured_time() {
    let (app, m) = setup(8);
    let (status, body) = get(&app, "/app/loadtest/").await;
    assert_eq!(status, StatusCode::OK);

    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Load test completed in "));

    let observed = m
        .histogram_sum(RESPONSE_TIME_SECONDS, &[("view_name", "load_test")])
        .as_secs_f64();
    assert!((0.09..1.1).contains(&observed), "observed={observed}");
}

#[tokio::test(start_paused = true)]
async fn delays_do_not_block_each_other() {
    let (app, m) = setup(9);
    let started = tokio::time::Instant::now();

    let mut set = tokio::task::JoinSet::new();
    for _ in 0..20 {
        let app = app.clone();
        set.spawn(async move { get(&app, "/app/loadtest/").await.0 });
    }
    while let Some(status) = set.join_next().await {
        assert_eq!(status.unwrap(), StatusCode::OK);
    }

    // Sequential would take at least 20 * 0.1s.
    assert!(started.elapsed().as_secs_f64() < 1.1);
    assert_eq!(requests(&m, "load_test"), 20);
    assert_eq!(observations(&m, "load_test"), 20);
}

#[tokio::test(start_paused = true)]
async fn metrics_endpoint_renders_families() {
    let (app, _) = setup(10);
    get(&app, "/app/health/").await;
    get(&app, "/app/search/?q=error").await;

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("custom_requests_total{method=\"GET\",view_name=\"health\"} 1"));
    assert!(text.contains("api_errors_total{error_type=\"invalid_query\",view_name=\"search\"} 1"));
    assert!(text.contains("custom_response_time_seconds_count{view_name=\"health\"} 1"));
    assert!(text.contains("# TYPE active_users_count gauge"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (app, _) = setup(11);
    let resp = app
        .oneshot(Request::builder().uri("/app/nope/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
