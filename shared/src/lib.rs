//! Shared types for the club administration service
//!
//! Common types used by the server crate and API clients: error types,
//! data models and small utilities.

pub mod error;
pub mod models;
pub mod serde_helpers;
pub mod util;

// Re-exports
pub use axum::Json;
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
