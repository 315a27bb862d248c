//! Health check endpoint
//!
//! Reports uptime and whether the classifier was loaded at startup. The
//! service stays up without a model; `/process` then answers with a
//! "failed" prediction response.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use harp_common::api::HealthResponse;

use crate::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let model = state.pipeline.model();
    let message = match model.unavailable_reason() {
        None => "model loaded".to_string(),
        Some(reason) => format!("model not loaded: {}", reason),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "harp-rp".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        model_loaded: model.is_loaded(),
        message,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
