//! Paginated listings: `/media`, `/images`, `/videos`.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::request_origin;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use mediahub_core::{AppError, MediaCategory, MediaPage, PageRequest, SortKey};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

/// Listing query. Every value is parsed leniently: garbage falls back to a default.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number (default 1)
    pub page: Option<String>,
    /// Page size (default 10)
    pub limit: Option<String>,
    /// newest (default), oldest, name, size or type
    pub sort: Option<String>,
    /// Comma-separated categories, or `all` (only used by `/media`)
    #[serde(rename = "type")]
    #[param(rename = "type")]
    pub media_type: Option<String>,
}

impl ListQuery {
    fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.limit.as_deref())
    }

    fn sort_key(&self) -> SortKey {
        SortKey::from_query(self.sort.as_deref())
    }
}

/// Categories selected by a `type` filter, in scan order.
///
/// An absent or empty filter, or one naming `all`, selects every category. Unknown
/// names are ignored, so a filter of only unknown names selects nothing.
pub fn parse_type_filter(raw: Option<&str>) -> Vec<MediaCategory> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty()).unwrap_or("all");
    let requested: Vec<String> = raw
        .split(',')
        .map(|t| t.trim().to_ascii_lowercase())
        .collect();

    if requested.iter().any(|t| t == "all") {
        return MediaCategory::ALL.to_vec();
    }

    MediaCategory::ALL
        .into_iter()
        .filter(|category| requested.iter().any(|t| t == category.as_str()))
        .collect()
}

async fn list(
    state: &AppState,
    headers: &HeaderMap,
    categories: &[MediaCategory],
    query: &ListQuery,
    failure_message: &str,
) -> Result<Json<MediaPage>, HttpAppError> {
    let origin = request_origin(&state.config, headers);
    let page = state
        .catalog
        .list(categories, query.sort_key(), query.page_request(), &origin)
        .await
        .map_err(|e| AppError::ProcessingFailed {
            message: failure_message.to_string(),
            details: e.to_string(),
        })?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/media",
    tag = "listing",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of media", body = MediaPage),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 500, description = "Failed to retrieve media", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, headers))]
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<MediaPage>, HttpAppError> {
    let categories = parse_type_filter(query.media_type.as_deref());
    list(&state, &headers, &categories, &query, "Failed to retrieve media").await
}

#[utoipa::path(
    get,
    path = "/images",
    tag = "listing",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of images", body = MediaPage),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 500, description = "Failed to retrieve images", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, headers))]
pub async fn list_images(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<MediaPage>, HttpAppError> {
    list(
        &state,
        &headers,
        &[MediaCategory::Image],
        &query,
        "Failed to retrieve images",
    )
    .await
}

#[utoipa::path(
    get,
    path = "/videos",
    tag = "listing",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of videos", body = MediaPage),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 500, description = "Failed to retrieve videos", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, headers))]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<MediaPage>, HttpAppError> {
    list(
        &state,
        &headers,
        &[MediaCategory::Video],
        &query,
        "Failed to retrieve videos",
    )
    .await
}
