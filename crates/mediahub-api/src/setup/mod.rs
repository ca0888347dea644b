//! Application setup and initialization
//!
//! This module contains all application initialization logic, kept out of main.rs
//! so tests can build the same router.

pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use crate::telemetry::LogFormat;
use anyhow::{Context, Result};
use mediahub_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let log_format = LogFormat::from_env();
    crate::telemetry::init_telemetry(log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Fail fast on misconfiguration; warnings need the subscriber above
    validation::validate_config(&config).context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment(),
        log_format = ?log_format,
        "Configuration loaded and validated successfully"
    );

    let state = services::initialize_services(&config).await?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
