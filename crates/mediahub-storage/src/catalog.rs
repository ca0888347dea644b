//! Media catalog aggregation: scan, filter, deduplicate, sort and paginate.

use crate::error::{StorageError, StorageResult};
use crate::local::create_dir_idempotent;
use crate::locator::StorageLocator;
use chrono::{DateTime, Utc};
use mediahub_core::models::extension_of;
use mediahub_core::{MediaCategory, MediaPage, PageRequest, SortKey, StoredMediaItem};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

/// Image files whose lowercased name contains this marker are never listed.
const EXCLUDED_IMAGE_MARKER: &str = "client";

#[derive(Clone, Debug)]
pub struct MediaCatalog {
    locator: StorageLocator,
}

impl MediaCatalog {
    pub fn new(locator: StorageLocator) -> Self {
        Self { locator }
    }

    /// Scan every listing directory of each category, in order.
    ///
    /// `origin` is prefixed to each item URL (`{origin}/{category}/{filename}`).
    /// The result is deduplicated by filename (first occurrence wins) but unsorted.
    /// Directories that cannot be created or read are skipped; the call fails only
    /// when none of them could be read.
    pub async fn collect(
        &self,
        categories: &[MediaCategory],
        origin: &str,
    ) -> StorageResult<Vec<StoredMediaItem>> {
        let mut items = Vec::new();
        let mut scanned = 0usize;
        let mut skipped = 0usize;
        for category in categories {
            for dir in self.locator.list_category_directories(*category) {
                if self
                    .scan_directory(*category, &dir, origin, &mut items)
                    .await
                {
                    scanned += 1;
                } else {
                    skipped += 1;
                }
            }
        }

        if scanned == 0 && skipped > 0 {
            return Err(StorageError::RootUnavailable(format!(
                "none of {} listing directories could be read",
                skipped
            )));
        }

        let mut seen = HashSet::new();
        items.retain(|item| seen.insert(item.filename.clone()));
        Ok(items)
    }

    /// Collect, sort and cut one page.
    #[tracing::instrument(skip(self, origin))]
    pub async fn list(
        &self,
        categories: &[MediaCategory],
        sort: SortKey,
        page: PageRequest,
        origin: &str,
    ) -> StorageResult<MediaPage> {
        let mut items = self.collect(categories, origin).await?;
        sort.sort(&mut items);
        tracing::debug!(total = items.len(), "Media catalog collected");
        Ok(MediaPage::paginate(items, page))
    }

    /// Append the listed files of `dir` to `items`. Returns `false` when the directory
    /// could not be read at all.
    async fn scan_directory(
        &self,
        category: MediaCategory,
        dir: &Path,
        origin: &str,
        items: &mut Vec<StoredMediaItem>,
    ) -> bool {
        if let Err(e) = create_dir_idempotent(dir).await {
            tracing::warn!(dir = %dir.display(), error = %e, "Could not create listing directory");
        }

        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable listing directory");
                return false;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "Stopped reading listing directory");
                    break;
                }
            };
            let Ok(filename) = entry.file_name().into_string() else {
                continue;
            };
            if !is_listed(category, &filename) {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "Skipping file whose metadata could not be read"
                    );
                    continue;
                }
            };

            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            items.push(StoredMediaItem {
                url: format!("{}/{}/{}", origin, category, filename),
                filename,
                created,
                size: metadata.len(),
                category,
            });
        }
        true
    }
}

fn is_listed(category: MediaCategory, filename: &str) -> bool {
    let Some(extension) = extension_of(filename) else {
        return false;
    };
    if !category.accepts_extension(&extension) {
        return false;
    }
    !(category == MediaCategory::Image
        && filename.to_lowercase().contains(EXCLUDED_IMAGE_MARKER))
}
