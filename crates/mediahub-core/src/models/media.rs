use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::MediaCategory;

/// One file on disk as exposed to clients.
///
/// Items are materialised on every listing request by scanning the storage
/// directories; the filesystem is the only source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StoredMediaItem {
    pub filename: String,
    /// Public URL, `{origin}/{category}/{filename}`
    pub url: String,
    /// Filesystem birth time, or modification time where birth time is unavailable
    pub created: DateTime<Utc>,
    /// Size in bytes
    pub size: u64,
    #[serde(rename = "type")]
    pub category: MediaCategory,
}
