//! Root endpoint describing the service

use axum::{routing::get, Json, Router};
use harp_common::api::ServiceInfo;
use std::collections::BTreeMap;

use crate::AppState;

/// GET /
pub async fn service_info() -> Json<ServiceInfo> {
    let endpoints = BTreeMap::from([
        ("GET /health".to_string(), "service and model status".to_string()),
        (
            "POST /process".to_string(),
            "upload a CSV file (multipart field 'file') for risk prediction".to_string(),
        ),
    ]);

    Json(ServiceInfo {
        app: "Heart Attack Risk Prediction System (API)".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}

pub fn info_routes() -> Router<AppState> {
    Router::new().route("/", get(service_info))
}
