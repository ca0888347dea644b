//! Maps a logical (category, filename) pair to a physical location.
//!
//! Reads search the category's candidate directories in their fixed order and take
//! the first existing file. Writes always go to a single canonical directory.
//! There is no locking between "probe" and "act": a file removed between the two
//! surfaces as a normal not-found or IO error.

use crate::error::{StorageError, StorageResult};
use crate::layout::{StorageLayout, WriteTarget, COMPRESSED_PREFIX};
use crate::local::{create_dir_idempotent, validate_filename, LocalStorage};
use mediahub_core::MediaCategory;
use std::path::PathBuf;

/// A resolved file: its key relative to the uploads root and its absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLocation {
    pub key: String,
    pub path: PathBuf,
}

impl MediaLocation {
    pub fn filename(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }

    /// Directory part of the key, empty for root-level files.
    pub fn dir(&self) -> &str {
        self.key
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or("")
    }
}

#[derive(Clone, Debug)]
pub struct StorageLocator {
    storage: LocalStorage,
}

impl StorageLocator {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    fn locate(&self, dir: &str, filename: &str) -> StorageResult<MediaLocation> {
        let key = LocalStorage::key_for(dir, filename);
        let path = self.storage.key_to_path(&key)?;
        Ok(MediaLocation { key, path })
    }

    /// Canonical directory for new uploads of `category`, created if absent.
    /// Safe to call concurrently.
    pub async fn resolve_write_dir(
        &self,
        category: MediaCategory,
        target: WriteTarget,
    ) -> StorageResult<PathBuf> {
        let dir = StorageLayout::for_category(category).write_dir(target);
        let path = self.storage.base_path().join(dir);
        create_dir_idempotent(&path).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create {} directory {}: {}",
                category,
                path.display(),
                e
            ))
        })?;
        Ok(path)
    }

    /// Location a new upload named `filename` should be written to.
    pub async fn resolve_write_path(
        &self,
        category: MediaCategory,
        target: WriteTarget,
        filename: &str,
    ) -> StorageResult<MediaLocation> {
        validate_filename(filename)?;
        self.resolve_write_dir(category, target).await?;
        let dir = StorageLayout::for_category(category).write_dir(target);
        self.locate(dir, filename)
    }

    /// Another file in the same directory as `location`.
    pub fn sibling(&self, location: &MediaLocation, filename: &str) -> StorageResult<MediaLocation> {
        validate_filename(filename)?;
        self.locate(location.dir(), filename)
    }

    /// First existing file among the category's read candidates.
    pub async fn resolve_read_path(
        &self,
        category: MediaCategory,
        filename: &str,
    ) -> StorageResult<MediaLocation> {
        validate_filename(filename)?;

        for candidate in StorageLayout::for_category(category).read_candidates {
            let name = format!("{}{}", candidate.prefix, filename);
            let location = self.locate(candidate.dir, &name)?;
            if self.storage.is_file(&location.key).await? {
                tracing::debug!(
                    category = %category,
                    filename = %filename,
                    key = %location.key,
                    "Resolved media read path"
                );
                return Ok(location);
            }
        }

        Err(StorageError::NotFound(format!("{}/{}", category, filename)))
    }

    /// Directories scanned when listing `category`, in order.
    pub fn list_category_directories(&self, category: MediaCategory) -> Vec<PathBuf> {
        StorageLayout::for_category(category)
            .list_dirs
            .iter()
            .map(|dir| self.storage.base_path().join(dir))
            .collect()
    }

    /// Ordered locations probed when deleting.
    ///
    /// Videos are probed under the compressed name first, then under the name as
    /// given, then (for names carrying the compressed marker) under the unprefixed
    /// original name, each across `video/`, `videos/` and the root.
    pub fn delete_candidates(
        &self,
        category: MediaCategory,
        filename: &str,
    ) -> StorageResult<Vec<MediaLocation>> {
        validate_filename(filename)?;

        if category != MediaCategory::Video {
            return StorageLayout::for_category(category)
                .read_candidates
                .iter()
                .map(|c| self.locate(c.dir, &format!("{}{}", c.prefix, filename)))
                .collect();
        }

        let mut names = vec![format!("{}{}", COMPRESSED_PREFIX, filename), filename.to_string()];
        if let Some(original) = filename.strip_prefix(COMPRESSED_PREFIX) {
            if !original.is_empty() {
                names.push(original.to_string());
            }
        }

        let mut candidates = Vec::new();
        for name in &names {
            for dir in StorageLayout::video_delete_dirs() {
                let location = self.locate(dir, name)?;
                if !candidates.contains(&location) {
                    candidates.push(location);
                }
            }
        }
        Ok(candidates)
    }

    /// Delete the first existing delete candidate.
    ///
    /// When the requested video name carries the compressed marker, the unprefixed
    /// original is also removed from every video directory on a best-effort basis;
    /// failures there are logged and never change the result. A plain name only
    /// removes the file it resolved to.
    pub async fn delete(
        &self,
        category: MediaCategory,
        filename: &str,
    ) -> StorageResult<MediaLocation> {
        let mut deleted = None;
        for candidate in self.delete_candidates(category, filename)? {
            if self.storage.is_file(&candidate.key).await? {
                self.storage.delete(&candidate.key).await?;
                deleted = Some(candidate);
                break;
            }
        }

        let deleted =
            deleted.ok_or_else(|| StorageError::NotFound(format!("{}/{}", category, filename)))?;

        if category == MediaCategory::Video {
            self.cleanup_paired_original(filename).await;
        }

        Ok(deleted)
    }

    async fn cleanup_paired_original(&self, requested: &str) {
        let Some(original) = requested.strip_prefix(COMPRESSED_PREFIX) else {
            return;
        };
        if original.is_empty() {
            return;
        }

        for dir in StorageLayout::video_delete_dirs() {
            let key = LocalStorage::key_for(dir, original);
            match self.storage.delete(&key).await {
                Ok(true) => {
                    tracing::info!(key = %key, "Removed original paired with compressed video")
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Failed to remove paired original video")
                }
            }
        }
    }
}
