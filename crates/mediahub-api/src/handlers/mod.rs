//! HTTP handlers, one module per route group.

pub mod image_upload;
pub mod media_delete;
pub mod media_download;
pub mod media_get;
pub mod media_list;
pub mod media_upload;
pub mod video_upload;

use crate::error::HttpAppError;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use futures::StreamExt;
use mediahub_core::models::content_type_for_filename;
use mediahub_core::AppError;
use mediahub_storage::{MediaLocation, StorageLocator};

/// How a streamed file should be presented to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    Inline,
    /// Save under the requested name
    Attachment,
}

/// Stream a resolved file. `requested_name` is the name the client asked for, which
/// differs from the stored name for legacy `compressed-` fallbacks.
pub(crate) async fn stream_file(
    locator: &StorageLocator,
    location: &MediaLocation,
    requested_name: &str,
    disposition: Disposition,
) -> Result<Response, HttpAppError> {
    let (length, stream) = locator.storage().download_stream(&location.key).await?;

    tracing::debug!(key = %location.key, size_bytes = length, "Streaming file from storage");

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            content_type_for_filename(location.filename()),
        )
        .header(header::CONTENT_LENGTH, length);

    if disposition == Disposition::Attachment {
        builder = builder.header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                requested_name.replace(['"', '\\'], "_")
            ),
        );
    }

    builder.body(Body::from_stream(body_stream)).map_err(|e| {
        tracing::error!(error = %e, "Failed to build response");
        AppError::Internal(e.to_string()).into()
    })
}
