//! Business endpoint (`GET /api`).
//!
//! Every call is timed into `http_response_time_seconds` and counted in
//! `http_requests_total` under the status actually sent. A configurable share
//! of calls (10% by default) fails on purpose with a 500 and also bumps
//! `error_rate`.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use pulsewatch_core::random::RandomSource;

use crate::app_state::AppState;
use crate::obs::metrics::AppMetrics;

pub const ROUTE: &str = "/api";

pub async fn api(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let rng = state.rng();
    respond(state.metrics(), rng.as_ref(), state.cfg().api.error_probability)
}

/// Handler body, independent of axum extraction.
pub fn respond(
    metrics: &AppMetrics,
    rng: &dyn RandomSource,
    error_probability: f64,
) -> (StatusCode, Json<Value>) {
    let timer = metrics.response_time.start_timer();

    let (status, body) = if rng.chance(error_probability) {
        if let Err(e) = metrics.errors.inc(&[]) {
            tracing::warn!(error = %e, "error counter update failed");
        }
        tracing::debug!(route = ROUTE, "simulated server error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "Simulated server error" }),
        )
    } else {
        (
            StatusCode::OK,
            json!({
                "message": "Realtime API response",
                "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            }),
        )
    };

    if let Err(e) = metrics
        .requests
        .inc(&["GET", ROUTE, status.as_str()])
    {
        tracing::warn!(error = %e, "request counter update failed");
    }

    timer.observe_duration();
    (status, Json(body))
}
