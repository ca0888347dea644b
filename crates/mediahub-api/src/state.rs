//! Application state shared by every handler.
//!
//! Everything in here is built once at startup and never mutated afterwards. The
//! encoder decision in particular is made exactly once and carried by the
//! orchestrator.

use mediahub_core::Config;
use mediahub_processing::{FileNamer, TranscodeOrchestrator, VideoEncoder};
use mediahub_storage::{LocalStorage, MediaCatalog, StorageLocator};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub locator: StorageLocator,
    pub catalog: MediaCatalog,
    pub orchestrator: TranscodeOrchestrator,
    pub namer: FileNamer,
}

impl AppState {
    /// Wire the storage components and the orchestrator around one uploads root.
    /// `encoder` is `None` when no encoder binary could be resolved.
    pub fn new(
        config: Config,
        storage: LocalStorage,
        encoder: Option<Arc<dyn VideoEncoder>>,
    ) -> Self {
        let locator = StorageLocator::new(storage);
        let timeout = config.transcode_timeout_secs().map(Duration::from_secs);

        Self {
            catalog: MediaCatalog::new(locator.clone()),
            orchestrator: TranscodeOrchestrator::new(locator.clone(), encoder, timeout),
            namer: FileNamer::new(),
            locator,
            config,
        }
    }
}
