//! Health check handler and response type.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

const TIMEOUT: Duration = Duration::from_secs(5);
const PROBE_KEY: &str = ".health-check";

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// Whether a probe file could be written to and removed from the uploads root
    pub uploads_dir_writable: bool,
    /// "available" when an encoder binary was found at startup
    pub transcoder: String,
}

/// Storage writability plus transcoder availability.
///
/// A missing encoder does not degrade the service since uploads fall back to a copy.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Healthy", body = HealthCheckResponse),
        (status = 503, description = "Uploads directory not writable", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = state.locator.storage().clone();
    let storage_status = run_check(
        TIMEOUT,
        async move {
            storage.write(PROBE_KEY, b"ok").await?;
            storage.delete(PROBE_KEY).await.map(drop)
        },
        "unhealthy",
    )
    .await;
    let overall_healthy = storage_status == "healthy";
    if !overall_healthy {
        tracing::error!(storage = %storage_status, "Uploads directory health check failed");
    }

    let response = HealthCheckResponse {
        status: if overall_healthy { "healthy" } else { "degraded" }.to_string(),
        uploads_dir_writable: overall_healthy,
        transcoder: if state.orchestrator.is_available() {
            "available"
        } else {
            "unavailable"
        }
        .to_string(),
    };

    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
