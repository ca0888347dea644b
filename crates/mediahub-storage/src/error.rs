//! Errors raised by the filesystem primitives and the locator.

use thiserror::Error;

/// One failed storage operation. Messages name the key or path involved.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No candidate location holds the requested file
    #[error("No stored file for {0}")]
    NotFound(String),

    /// The key or filename would leave the uploads root
    #[error("Rejected storage key: {0}")]
    InvalidKey(String),

    #[error("Could not write {0}")]
    WriteFailed(String),

    #[error("Could not read {0}")]
    ReadFailed(String),

    #[error("Could not copy {0}")]
    CopyFailed(String),

    #[error("Could not delete {0}")]
    DeleteFailed(String),

    /// The uploads root itself is missing or unusable
    #[error("Uploads root unavailable: {0}")]
    RootUnavailable(String),

    #[error("Filesystem error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
