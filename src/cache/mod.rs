//! Cache Module
//!
//! The multi-tier cache engine: a fast in-process tier, an optional
//! session-scoped overlay tier, and an optional durable file-backed
//! tier, composed by the [`TieredCache`] orchestrator.

mod durable;
mod entry;
mod fast;
mod global;
mod persistent;
mod remote;
mod scoped;
mod stats;
mod tiered;


// Re-export public types
pub use durable::DurableTier;
pub use entry::{current_timestamp_ms, CacheEntry, DEFAULT_TTL_SECONDS};
pub use fast::{FastTier, FastTierUsage};
pub use global::{global, reset_global};
pub use persistent::{PersistentTier, PersistentUsage};
pub use remote::RemoteTierAdapter;
pub use scoped::{ScopeStore, ScopedTier, ScopedTierUsage};
pub use stats::{CacheStatistics, StatisticsSnapshot, TierLevel};
pub use tiered::{CacheReport, SetOptions, TierUsages, TieredCache};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
