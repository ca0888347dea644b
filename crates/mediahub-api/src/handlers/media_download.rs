use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::{stream_file, Disposition};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
};
use mediahub_core::{AppError, MediaCategory};
use mediahub_storage::StorageError;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/download/{type}/{filename}",
    tag = "media",
    params(
        ("type" = String, Path, description = "image, video, audio, pdf, doc, document or documents"),
        ("filename" = String, Path, description = "Stored filename")
    ),
    responses(
        (status = 200, description = "File as attachment", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid media type", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "download_media"))]
pub async fn download_media(
    State(state): State<Arc<AppState>>,
    Path((media_type, filename)): Path<(String, String)>,
) -> Result<Response, HttpAppError> {
    let category = MediaCategory::from_download_type(&media_type)
        .ok_or_else(|| AppError::BadRequest("Invalid media type".to_string()))?;

    let location = state
        .locator
        .resolve_read_path(category, &filename)
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) | StorageError::InvalidKey(_) => {
                HttpAppError(AppError::NotFound("File not found".to_string()))
            }
            other => other.into(),
        })?;

    stream_file(&state.locator, &location, &filename, Disposition::Attachment).await
}
