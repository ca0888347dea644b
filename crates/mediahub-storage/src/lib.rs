//! Mediahub Storage Library
//!
//! Local filesystem storage for uploaded media.
//!
//! # Layout
//!
//! Everything lives under one uploads root. Each category has one canonical write
//! directory and an ordered list of read-candidate directories covering the
//! singular, plural and root-level conventions used by earlier versions of the
//! service. The table is fixed in [`layout`] and every read, write, delete and list
//! operation goes through it, so the conventions cannot drift apart.
//!
//! # Keys
//!
//! Storage keys are paths relative to the uploads root (`video/clip-1700000000000.mp4`).
//! Keys must not contain `..` or a leading `/`.

pub mod catalog;
pub mod error;
pub mod layout;
pub mod local;
pub mod locator;

// Re-export commonly used types
pub use catalog::MediaCatalog;
pub use error::{StorageError, StorageResult};
pub use layout::{CategoryLayout, ReadCandidate, StorageLayout, WriteTarget, COMPRESSED_PREFIX};
pub use local::{validate_filename, FileStream, LocalStorage};
pub use locator::{MediaLocation, StorageLocator};
