//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use crate::setup::routes::health;
use mediahub_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("One of the configured API_KEYS"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MediaHub API",
        version = "0.1.0",
        description = "Upload, retrieval, listing and deletion of images, videos, audio, PDFs and documents stored on the local filesystem. Images are re-encoded on upload; videos are compressed with ffmpeg when available."
    ),
    paths(
        // Retrieval
        handlers::media_get::get_image,
        handlers::media_get::get_video,
        handlers::media_get::get_audio,
        handlers::media_get::get_pdf,
        handlers::media_get::get_doc,
        handlers::media_download::download_media,
        handlers::media_delete::delete_media,
        // Listing
        handlers::media_list::list_media,
        handlers::media_list::list_images,
        handlers::media_list::list_videos,
        // Uploads
        handlers::image_upload::upload_image,
        handlers::image_upload::upload_image_with_quality,
        handlers::video_upload::upload_video,
        handlers::media_upload::upload_media,
        // Health
        health::health_check,
    ),
    components(
        schemas(
            models::MediaCategory,
            models::StoredMediaItem,
            models::MediaPage,
            models::PageRef,
            handlers::media_upload::UploadUrlResponse,
            handlers::media_delete::DeleteResponse,
            health::HealthCheckResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "media", description = "Inline retrieval, download and deletion of stored files"),
        (name = "listing", description = "Paginated listings built from the storage directories"),
        (name = "upload", description = "Image, video and generic uploads"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
