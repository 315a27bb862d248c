//! Prediction upload endpoint
//!
//! `POST /process` accepts a multipart form with a CSV file in the `file`
//! field. The upload is processed in memory on a blocking worker and the
//! pipeline result is returned as-is: pipeline failures are a `"failed"`
//! [`PredictionResponse`] with HTTP 200, transport problems are an
//! [`ApiError`].

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use harp_common::api::PredictionResponse;
use std::sync::Arc;
use tracing::{info, info_span, Instrument, Span};
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying the CSV upload
pub const UPLOAD_FIELD: &str = "file";

struct Upload {
    file_name: Option<String>,
    content: Bytes,
}

/// POST /process
pub async fn process_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<PredictionResponse>> {
    let request_id = Uuid::new_v4();
    process_upload(state, multipart)
        .instrument(info_span!("process", %request_id))
        .await
}

async fn process_upload(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<PredictionResponse>> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let upload = read_upload(&mut multipart).await?;

    info!(
        file_name = upload.file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = upload.content.len(),
        "Received upload"
    );

    let pipeline = Arc::clone(&state.pipeline);
    let content = upload.content;
    let span = Span::current();
    let response = tokio::task::spawn_blocking(move || {
        span.in_scope(|| pipeline.predict_csv(&content))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("prediction task failed: {}", e)))?;

    Ok(Json(response))
}

/// First multipart field named [`UPLOAD_FIELD`]
async fn read_upload(multipart: &mut Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload { file_name, content });
    }

    Err(ApiError::BadRequest(format!(
        "multipart field '{}' is required",
        UPLOAD_FIELD
    )))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

pub fn process_routes() -> Router<AppState> {
    Router::new().route("/process", post(process_file))
}
