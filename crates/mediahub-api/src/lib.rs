//! Mediahub API Library
//!
//! This crate provides the HTTP handlers, middleware and application setup.

// Module declarations
mod api_doc;
mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod middleware;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
