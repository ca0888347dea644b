//! `DELETE /delete/{type}/{filename}` for images and videos.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use mediahub_core::{AppError, MediaCategory};
use mediahub_storage::StorageError;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
    /// Deleted file, relative to the uploads root
    pub path: String,
}

#[utoipa::path(
    delete,
    path = "/delete/{type}/{filename}",
    tag = "media",
    params(
        ("type" = String, Path, description = "image or video"),
        ("filename" = String, Path, description = "Stored filename")
    ),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 400, description = "Invalid media type", body = ErrorResponse),
        (status = 404, description = "Image or video not found", body = ErrorResponse),
        (status = 500, description = "Failed to delete", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "delete_media"))]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path((media_type, filename)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    let category = match media_type.parse::<MediaCategory>() {
        Ok(category @ (MediaCategory::Image | MediaCategory::Video)) => category,
        _ => {
            return Err(AppError::BadRequest(
                "Invalid media type. Type must be 'image' or 'video'".to_string(),
            )
            .into())
        }
    };
    let name = category.display_name();

    let deleted = state
        .locator
        .delete(category, &filename)
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) | StorageError::InvalidKey(_) => {
                AppError::NotFound(format!("{} not found", name))
            }
            other => AppError::ProcessingFailed {
                message: format!("Failed to delete {}", category),
                details: other.to_string(),
            },
        })?;

    tracing::info!(category = %category, key = %deleted.key, "Media deleted");

    Ok(Json(DeleteResponse {
        message: format!("{} deleted successfully", name),
        path: deleted.key,
    }))
}
