//! `POST /media/upload/{type}`: store any category as received.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::request_origin;
use crate::utils::upload::{read_upload_form, validate_file_size};
use axum::{
    extract::{Multipart, Path, State},
    http::HeaderMap,
    Json,
};
use mediahub_core::{AppError, MediaCategory};
use mediahub_storage::WriteTarget;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadUrlResponse {
    /// `{origin}/{type}/{file}`, or `{origin}/download/{type}/{file}` with `fordownload`
    pub url: String,
}

#[utoipa::path(
    post,
    path = "/media/upload/{type}",
    tag = "upload",
    params(("type" = String, Path, description = "image, video, audio, pdf or doc")),
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Any file field; optional `fordownload` text field"),
    responses(
        (status = 200, description = "Stored file URL", body = UploadUrlResponse),
        (status = 400, description = "No file uploaded, or invalid media type", body = ErrorResponse),
        (status = 500, description = "Failed to upload media", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, headers, multipart), fields(operation = "upload_media"))]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    Path(media_type): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<UploadUrlResponse>, HttpAppError> {
    let category: MediaCategory = media_type
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid media type".to_string()))?;

    let mut form = read_upload_form(multipart, None).await?;
    let file = form
        .take_file_or_buffer()?
        .ok_or_else(|| AppError::InvalidInput("No file uploaded".to_string()))?;
    validate_file_size(file.data.len(), state.config.max_upload_size_bytes())?;

    let filename = state.namer.generic_name(
        category,
        file.content_type.as_deref(),
        file.original_name.as_deref(),
    );

    let upload_failed = |e: mediahub_storage::StorageError| AppError::ProcessingFailed {
        message: "Failed to upload media".to_string(),
        details: e.to_string(),
    };
    let location = state
        .locator
        .resolve_write_path(category, WriteTarget::Generic, &filename)
        .await
        .map_err(upload_failed)?;
    let written = state
        .locator
        .storage()
        .write(&location.key, &file.data)
        .await
        .map_err(upload_failed)?;

    tracing::info!(
        category = %category,
        key = %location.key,
        size_bytes = written,
        "Media uploaded"
    );

    let origin = request_origin(&state.config, &headers);
    let url = if form.for_download() {
        format!("{}/download/{}/{}", origin, category, filename)
    } else {
        format!("{}/{}/{}", origin, category, filename)
    };

    Ok(Json(UploadUrlResponse { url }))
}
