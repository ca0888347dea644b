//! Route configuration and setup.
//!
//! Retrieval routes are public; listing, upload and delete routes sit behind the
//! API key middleware. Health checks live in [health](health).

pub mod health;

use crate::auth::{auth_middleware, AuthState};
use crate::handlers::{
    image_upload, media_delete, media_download, media_get, media_list, media_upload,
    video_upload,
};
use crate::middleware::request_id_middleware;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use mediahub_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa_rapidoc::RapiDoc;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = AuthState::new(config.api_keys().to_vec());

    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        Arc::new(auth_state),
        auth_middleware,
    ));
    let app_state_routes = public_routes().merge(protected_routes);

    let http_concurrency_limit = config.http_concurrency_limit();
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        max_upload_size_bytes = config.max_upload_size_bytes(),
        "HTTP limit layers enabled"
    );

    let app = app_state_routes
        .merge(RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(config.max_upload_size_bytes()))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/image/{filename}", get(media_get::get_image))
        .route("/video/{filename}", get(media_get::get_video))
        .route("/audio/{filename}", get(media_get::get_audio))
        .route("/pdf/{filename}", get(media_get::get_pdf))
        .route("/doc/{filename}", get(media_get::get_doc))
        .route(
            "/download/{type}/{filename}",
            get(media_download::download_media),
        )
        .route("/api/openapi.json", get(openapi_json))
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/media", get(media_list::list_media))
        .route("/images", get(media_list::list_images))
        .route("/videos", get(media_list::list_videos))
        .route("/upload/image", post(image_upload::upload_image))
        .route(
            "/upload/image/{quality}",
            post(image_upload::upload_image_with_quality),
        )
        .route("/upload/video", post(video_upload::upload_video))
        .route("/media/upload/{type}", post(media_upload::upload_media))
        .route("/delete/{type}/{filename}", delete(media_delete::delete_media))
}

async fn openapi_json() -> impl IntoResponse {
    Json(crate::api_doc::get_openapi_spec())
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
