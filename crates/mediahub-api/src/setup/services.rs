//! Storage and encoder initialization

use crate::state::AppState;
use anyhow::{Context, Result};
use mediahub_core::Config;
use mediahub_processing::{discover_ffmpeg, FfmpegEncoder, VideoEncoder};
use mediahub_storage::LocalStorage;
use std::sync::Arc;

/// Build the shared state: open the uploads root and resolve the encoder once.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let storage = LocalStorage::new(config.uploads_dir().clone())
        .await
        .context("Failed to initialize uploads directory")?;
    tracing::info!(uploads_dir = %config.uploads_dir().display(), "Local storage ready");

    let encoder = discover_ffmpeg(config.ffmpeg_path())
        .map(|binary| Arc::new(FfmpegEncoder::new(binary)) as Arc<dyn VideoEncoder>);

    let state = AppState::new(config.clone(), storage, encoder);
    match state.orchestrator.encoder_name() {
        Some(name) => tracing::info!(encoder = name, "Video compression enabled"),
        None => tracing::warn!("Video compression disabled, uploads are stored as copies"),
    }

    Ok(Arc::new(state))
}
