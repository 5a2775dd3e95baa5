//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default TTL in seconds applied when the caller does not supply one.
pub const DEFAULT_TTL_SECONDS: i64 = 300;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// The same record is stored in every tier: in memory by the fast tier,
/// as a JSON string in the scoped tier's bag, and as a JSON file payload
/// in the durable tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Creation timestamp (Unix milliseconds), never mutated
    pub created_at: u64,
    /// Lifetime in seconds; zero or negative means expired immediately
    pub ttl_seconds: i64,
    /// Tags used for grouped invalidation
    #[serde(default)]
    pub tags: HashSet<String>,
    /// Number of successful reads of this entry instance
    #[serde(default)]
    pub hits: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_seconds` - Lifetime in seconds (see [`DEFAULT_TTL_SECONDS`])
    /// * `tags` - Invalidation tags
    pub fn new(value: Value, ttl_seconds: i64, tags: impl IntoIterator<Item = String>) -> Self {
        Self {
            value,
            created_at: current_timestamp_ms(),
            ttl_seconds,
            tags: tags.into_iter().collect(),
            hits: 0,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once strictly more than `ttl_seconds` have
    /// elapsed since creation. A zero or negative TTL therefore expires
    /// the entry the instant any time has passed; such values are
    /// accepted, not rejected.
    pub fn is_expired(&self) -> bool {
        self.elapsed_ms() > self.ttl_seconds.saturating_mul(1000)
    }

    // == Age ==
    /// Returns the entry age in whole seconds.
    pub fn age_seconds(&self) -> u64 {
        (self.elapsed_ms().max(0) as u64) / 1000
    }

    // == Record Hit ==
    /// Increments the read counter for this entry instance.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Tag Match ==
    /// Checks whether the entry carries any of the given tags.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.tags.contains(tag))
    }

    fn elapsed_ms(&self) -> i64 {
        current_timestamp_ms() as i64 - self.created_at as i64
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
