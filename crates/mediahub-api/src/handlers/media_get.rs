//! Inline file serving: `GET /{category}/{filename}`.

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

#[tracing::instrument(skip(state, category), fields(category = %category))]
async fn serve_inline(
    state: &AppState,
    category: MediaCategory,
    filename: &str,
) -> Result<Response, HttpAppError> {
    let location = state
        .locator
        .resolve_read_path(category, filename)
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) | StorageError::InvalidKey(_) => HttpAppError(
                AppError::NotFound(format!("{} not found", category.display_name())),
            ),
            other => other.into(),
        })?;

    stream_file(&state.locator, &location, filename, Disposition::Inline).await
}

#[utoipa::path(
    get,
    path = "/image/{filename}",
    tag = "media",
    params(("filename" = String, Path, description = "Stored image filename")),
    responses(
        (status = 200, description = "Image file", content_type = "application/octet-stream"),
        (status = 404, description = "Image not found", body = ErrorResponse)
    )
)]
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    serve_inline(&state, MediaCategory::Image, &filename).await
}

#[utoipa::path(
    get,
    path = "/video/{filename}",
    tag = "media",
    params(("filename" = String, Path, description = "Stored video filename")),
    responses(
        (status = 200, description = "Video file", content_type = "application/octet-stream"),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    serve_inline(&state, MediaCategory::Video, &filename).await
}

#[utoipa::path(
    get,
    path = "/audio/{filename}",
    tag = "media",
    params(("filename" = String, Path, description = "Stored audio filename")),
    responses(
        (status = 200, description = "Audio file", content_type = "application/octet-stream"),
        (status = 404, description = "Audio not found", body = ErrorResponse)
    )
)]
pub async fn get_audio(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    serve_inline(&state, MediaCategory::Audio, &filename).await
}

#[utoipa::path(
    get,
    path = "/pdf/{filename}",
    tag = "media",
    params(("filename" = String, Path, description = "Stored PDF filename")),
    responses(
        (status = 200, description = "PDF file", content_type = "application/pdf"),
        (status = 404, description = "PDF not found", body = ErrorResponse)
    )
)]
pub async fn get_pdf(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    serve_inline(&state, MediaCategory::Pdf, &filename).await
}

#[utoipa::path(
    get,
    path = "/doc/{filename}",
    tag = "media",
    params(("filename" = String, Path, description = "Stored document filename")),
    responses(
        (status = 200, description = "Document file", content_type = "application/octet-stream"),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
pub async fn get_doc(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    serve_inline(&state, MediaCategory::Doc, &filename).await
}
