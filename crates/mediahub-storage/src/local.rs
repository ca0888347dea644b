//! Filesystem primitives under the uploads root, addressed by storage key.

use crate::error::{StorageError, StorageResult};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Byte stream of a stored file.
pub type FileStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Reject filenames that could address anything outside their directory.
pub fn validate_filename(filename: &str) -> StorageResult<()> {
    let escapes = filename.is_empty()
        || filename.contains("..")
        || filename.contains(['/', '\\', '\0']);
    if escapes {
        return Err(StorageError::InvalidKey(format!("filename {:?}", filename)));
    }
    Ok(())
}

/// `"<path>: <cause>"`, the payload of every path-level storage error.
fn at(path: &Path, e: io::Error) -> String {
    format!("{}: {}", path.display(), e)
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Local filesystem storage rooted at the uploads directory
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Open the uploads root, creating it when absent.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)
            .await
            .map_err(|e| StorageError::RootUnavailable(at(&base_path, e)))?;
        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a key to a path under the root. Only plain relative components are allowed.
    pub fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(storage_key);
        let plain = !storage_key.is_empty()
            && !storage_key.contains("..")
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(StorageError::InvalidKey(format!("key {:?}", storage_key)));
        }
        Ok(self.base_path.join(relative))
    }

    /// Join a directory (relative to the root, empty for the root itself) and a filename
    /// into a storage key.
    pub fn key_for(dir: &str, filename: &str) -> String {
        if dir.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", dir, filename)
        }
    }

    async fn prepare_parent(path: &Path) -> StorageResult<()> {
        match path.parent() {
            Some(parent) => create_dir_idempotent(parent).await,
            None => Ok(()),
        }
    }

    /// Write `data` to `storage_key`, replacing any existing file, and fsync it.
    pub async fn write(&self, storage_key: &str, data: &[u8]) -> StorageResult<u64> {
        let path = self.key_to_path(storage_key)?;
        Self::prepare_parent(&path).await?;
        let start = Instant::now();

        async fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
            let mut file = fs::File::create(path).await?;
            file.write_all(data).await?;
            file.sync_all().await
        }
        write_synced(&path, data)
            .await
            .map_err(|e| StorageError::WriteFailed(at(&path, e)))?;

        tracing::info!(
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = elapsed_ms(start),
            "Stored file"
        );
        Ok(data.len() as u64)
    }

    /// Byte-for-byte copy, replacing the destination if it exists.
    pub async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<u64> {
        let from = self.key_to_path(from_key)?;
        let to = self.key_to_path(to_key)?;
        if !self.is_file(from_key).await? {
            return Err(StorageError::NotFound(from_key.to_string()));
        }
        Self::prepare_parent(&to).await?;
        let start = Instant::now();

        let copied = fs::copy(&from, &to).await.map_err(|e| {
            StorageError::CopyFailed(format!("{} to {}", from.display(), at(&to, e)))
        })?;

        tracing::info!(
            from_key = %from_key,
            to_key = %to_key,
            size_bytes = copied,
            duration_ms = elapsed_ms(start),
            "Copied file"
        );
        Ok(copied)
    }

    /// Remove a file. Returns `false` when there was nothing to remove.
    pub async fn delete(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %storage_key, "Deleted file");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(at(&path, e))),
        }
    }

    /// True when the key names an existing regular file.
    pub async fn is_file(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::metadata(&path)
            .await
            .is_ok_and(|meta| meta.is_file()))
    }

    /// Open a file as a byte stream, returning its length alongside.
    pub async fn download_stream(&self, storage_key: &str) -> StorageResult<(u64, FileStream)> {
        let path = self.key_to_path(storage_key)?;
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => return Err(StorageError::ReadFailed(at(&path, e))),
        };
        let length = file.metadata().await?.len();

        let key = storage_key.to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |chunk| {
            chunk.map_err(|e| {
                tracing::error!(key = %key, error = %e, "Stream read failed mid-transfer");
                StorageError::ReadFailed(format!("{}: {}", key, e))
            })
        });

        Ok((length, Box::pin(stream)))
    }
}

/// `create_dir_all` that treats a concurrent creator winning the race as success.
pub(crate) async fn create_dir_idempotent(path: &Path) -> StorageResult<()> {
    match fs::create_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(StorageError::IoError(e)),
    }
}
