//! JSON bodies for the simulated endpoints.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};
use vitals_core::profile::{Detail, ErrorKind};

/// Version reported by the health endpoint.
pub const API_VERSION: &str = "1.0.0";

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

pub fn failure(kind: ErrorKind) -> Value {
    json!({ "error": kind.message() })
}

/// Success body for `detail`; `elapsed` is the time spent in the handler so far.
pub fn success(detail: &Detail, elapsed: Duration) -> Value {
    let elapsed = elapsed.as_secs_f64();
    match detail {
        Detail::Home { active_users, .. } => json!({
            "message": "Welcome to Vitals Monitoring",
            "active_users": active_users,
            "timestamp": unix_now(),
        }),
        Detail::UserProfile {
            user_id,
            username_no,
        } => json!({
            "user_id": user_id,
            "username": format!("user_{username_no}"),
            "profile_loaded": true,
            "load_time": elapsed,
        }),
        Detail::Search { query, scores } => {
            let results: Vec<Value> = scores
                .iter()
                .enumerate()
                .map(|(i, score)| {
                    json!({
                        "id": i,
                        "title": format!("Result {i} for \"{query}\""),
                        "score": score,
                    })
                })
                .collect();
            json!({
                "query": query,
                "total_results": results.len(),
                "results": results,
                "search_time": elapsed,
            })
        }
        Detail::HeavyComputation { result } => json!({
            "result": result,
            "computation_time": elapsed,
            "status": "completed",
        }),
        Detail::FileUpload { size_mb, file_no } => json!({
            "filename": format!("file_{file_no}.txt"),
            "size_mb": size_mb,
            "upload_time": elapsed,
            "status": "uploaded",
        }),
        Detail::Analytics {
            daily_users,
            page_views,
            bounce_rate,
            avg_session_duration,
        } => json!({
            "daily_users": daily_users,
            "page_views": page_views,
            "bounce_rate": bounce_rate,
            "avg_session_duration": avg_session_duration,
            "generated_at": unix_now(),
        }),
        Detail::Health => json!({
            "status": "healthy",
            "timestamp": unix_now(),
            "version": API_VERSION,
        }),
        Detail::LoadTest { request_id } => json!({
            "message": format!("Load test completed in {elapsed:.3}s"),
            "request_id": request_id,
        }),
    }
}
