//! Mediahub Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every Mediahub component.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{is_production_name, BaseConfig, Config, ServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{MediaCategory, MediaPage, PageRef, PageRequest, SortKey, StoredMediaItem};
