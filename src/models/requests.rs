//! Request DTOs for the cache engine API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::MAX_KEY_LENGTH;

/// Request body for the SET operation (PUT /set)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store; any JSON payload
    pub value: Value,
    /// Optional TTL in seconds; zero or negative expires immediately
    #[serde(default)]
    pub ttl: Option<i64>,
    /// Optional invalidation tags
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Whether the write also goes to the durable tier
    #[serde(default)]
    pub persistent: Option<bool>,
}

impl SetRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        None
    }
}

/// Request body for the INVALIDATE operation (POST /invalidate)
///
/// At least one selector should be supplied; with both absent nothing
/// is removed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateRequest {
    /// Key substring selector
    #[serde(default)]
    pub pattern: Option<String>,
    /// Tag selector
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Request body for the CLEAR operation (POST /clear)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearRequest {
    /// Tier names ("fast", "scoped", "durable") or "all"; defaults to all
    #[serde(default)]
    pub levels: Option<Vec<String>>,
}
