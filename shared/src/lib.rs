//! Shared types for the dining session service
//!
//! Domain models, API DTOs, error codes and small utilities used by both
//! `session-server` and `session-client`.

pub mod client;
pub mod dto;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
