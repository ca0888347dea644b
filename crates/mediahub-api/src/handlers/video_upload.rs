//! `POST /upload/video`: store, compress and answer with the compressed path.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{read_upload_form, validate_file_size};
use axum::extract::{Multipart, State};
use mediahub_core::AppError;
use mediahub_processing::TranscodeOutcome;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/upload/video",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "File field `video`"),
    responses(
        (status = 200, description = "Served path, e.g. video/compressed-clip-1700000000000.mp4", body = String, content_type = "text/plain"),
        (status = 400, description = "No video provided", body = ErrorResponse),
        (status = 500, description = "Failed to compress video", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_video"))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<String, HttpAppError> {
    let mut form = read_upload_form(multipart, Some("video")).await?;
    let file = form
        .file
        .take()
        .filter(|file| !file.data.is_empty())
        .ok_or_else(|| AppError::InvalidInput("No video provided".to_string()))?;
    validate_file_size(file.data.len(), state.config.max_upload_size_bytes())?;

    let filename = state.namer.video_name(file.original_name.as_deref());
    tracing::info!(
        original_name = ?file.original_name,
        size_bytes = file.data.len(),
        filename = %filename,
        "Processing video upload"
    );

    let outcome = state.orchestrator.process(&filename, file.data).await?;
    if let TranscodeOutcome::Degraded { reason, .. } = &outcome {
        tracing::warn!(filename = %filename, reason = %reason, "Video stored without compression");
    }

    Ok(outcome.served_path())
}
