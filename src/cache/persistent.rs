//! Persistent Tier Contract
//!
//! The durable slot of the engine is pluggable: the file-backed
//! [`DurableTier`](crate::cache::DurableTier) is the default, and a
//! network-backed peer can stand in for it by implementing this trait.
//! Implementations absorb their own I/O failures and report them as
//! misses; nothing here returns an error to the orchestrator.

use std::fmt;

use serde::Serialize;

use crate::cache::CacheEntry;

// == Persistent Tier ==
/// Read/write/invalidate contract for the slowest tier.
pub trait PersistentTier: fmt::Debug + Send + Sync {
    /// Retrieves an entry, treating any internal failure as a miss.
    fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Stores an entry; failures are absorbed.
    fn set(&self, key: &str, entry: &CacheEntry);

    /// Removes matching entries and returns the number removed.
    fn invalidate(&self, pattern: Option<&str>, tags: Option<&[String]>) -> u64;

    /// Removes everything unconditionally.
    fn clear(&self);

    /// Removes all expired entries; returns the number removed.
    fn cleanup_expired(&self) -> u64;

    /// Returns an occupancy snapshot.
    fn usage(&self) -> PersistentUsage;
}

// == Persistent Usage ==
/// Occupancy snapshot for a persistent tier.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PersistentUsage {
    pub entries: usize,
    pub total_bytes: u64,
    pub max_size_bytes: u64,
}
