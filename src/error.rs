//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.
//!
//! Tier-internal I/O and serialization failures never appear here: they
//! are absorbed inside the tiers and reported as misses. What remains is
//! the construction-time configuration surface and the HTTP request
//! taxonomy.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine and its HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in any tier
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Engine construction failed (e.g. unusable durable directory)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CacheError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            CacheError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type; the error defaults to [`CacheError`] but can
/// be overridden, as `get_or_compute` does with its caller's error type.
pub type Result<T, E = CacheError> = std::result::Result<T, E>;
