//! `POST /upload/image[/{quality}]`: re-encode and store one image.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{read_upload_form, validate_file_size};
use axum::extract::{Multipart, Path, State};
use mediahub_core::models::extension_of;
use mediahub_core::{AppError, MediaCategory};
use mediahub_processing::{encode_image, ImageQuality};
use mediahub_storage::WriteTarget;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/upload/image",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "File field `image`, or text fields `buffer` (base64), `filename`, `mimetype`"),
    responses(
        (status = 200, description = "Stored path, e.g. image/1700000000000.jpg", body = String, content_type = "text/plain"),
        (status = 400, description = "No image provided", body = ErrorResponse),
        (status = 500, description = "Failed to process image", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<String, HttpAppError> {
    process_image_upload(&state, None, multipart).await
}

#[utoipa::path(
    post,
    path = "/upload/image/{quality}",
    tag = "upload",
    params(("quality" = u8, Path, description = "JPEG quality, 1 to 100")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored path, e.g. image/1700000000000.jpg", body = String, content_type = "text/plain"),
        (status = 400, description = "No image provided, or quality out of range", body = ErrorResponse),
        (status = 500, description = "Failed to process image", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_image_with_quality(
    State(state): State<Arc<AppState>>,
    Path(quality): Path<String>,
    multipart: Multipart,
) -> Result<String, HttpAppError> {
    process_image_upload(&state, Some(&quality), multipart).await
}

#[tracing::instrument(skip(state, multipart), fields(operation = "upload_image"))]
async fn process_image_upload(
    state: &AppState,
    quality: Option<&str>,
    multipart: Multipart,
) -> Result<String, HttpAppError> {
    let mut form = read_upload_form(multipart, Some("image")).await?;
    let file = form
        .take_file_or_buffer()?
        .ok_or_else(|| AppError::InvalidInput("No image provided".to_string()))?;
    if file.data.is_empty() {
        return Err(AppError::InvalidInput("Invalid image data".to_string()).into());
    }
    validate_file_size(file.data.len(), state.config.max_upload_size_bytes())?;

    let default_quality = ImageQuality::new(state.config.default_image_quality())?;
    let quality = ImageQuality::parse(quality, default_quality)?;

    let filename = state
        .namer
        .image_name(file.content_type.as_deref(), file.original_name.as_deref());
    let extension = extension_of(&filename)
        .unwrap_or_else(|| MediaCategory::Image.default_extension().to_string());

    tracing::info!(
        original_name = ?file.original_name,
        content_type = ?file.content_type,
        size_bytes = file.data.len(),
        quality = quality.value(),
        filename = %filename,
        "Processing image upload"
    );

    let encoded = encode_image(file.data, extension, quality).await?;

    let processing_failed = |e: mediahub_storage::StorageError| AppError::ProcessingFailed {
        message: "Failed to process image".to_string(),
        details: e.to_string(),
    };
    let location = state
        .locator
        .resolve_write_path(MediaCategory::Image, WriteTarget::Dedicated, &filename)
        .await
        .map_err(processing_failed)?;
    state
        .locator
        .storage()
        .write(&location.key, &encoded)
        .await
        .map_err(processing_failed)?;

    Ok(format!("{}/{}", MediaCategory::Image, filename))
}
