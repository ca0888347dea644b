//! Bearer API key authentication for protected routes.

pub mod middleware;

pub use middleware::{auth_middleware, AuthState};
