//! harp-rp library - Heart attack risk prediction service
//!
//! Exposes the prediction pipeline and the HTTP router for the binary and
//! for integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use harp_common::config::DEFAULT_MAX_UPLOAD_BYTES;
use pipeline::{ModelHandle, RiskPipeline};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Prediction pipeline bound to the classifier loaded at startup
    pub pipeline: Arc<RiskPipeline>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(model: ModelHandle) -> Self {
        Self {
            pipeline: Arc::new(RiskPipeline::new(model)),
            startup_time: Utc::now(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .merge(api::info_routes())
        .merge(api::health_routes())
        .merge(api::process_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}
