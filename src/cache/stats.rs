//! Cache Statistics Module
//!
//! Tracks aggregate performance metrics across all cache tiers.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Tier Level ==
/// Identifies one of the three cache tiers.
///
/// Used both for attributing hits to a tier and for selecting tiers in
/// `clear` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierLevel {
    /// L1: in-process map with LRU eviction
    Fast,
    /// L2: session/request scoped overlay
    Scoped,
    /// L3: file-backed durable storage (or a remote peer standing in for it)
    Durable,
}

impl FromStr for TierLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(TierLevel::Fast),
            "scoped" => Ok(TierLevel::Scoped),
            "durable" => Ok(TierLevel::Durable),
            other => Err(format!("Unknown tier level: {}", other)),
        }
    }
}

// == Cache Statistics ==
/// Aggregate counters for one cache engine instance.
///
/// Owned and mutated exclusively by the orchestrator; tiers never touch
/// it. Counters are atomic so the orchestrator needs no lock of its own.
#[derive(Debug, Default)]
pub struct CacheStatistics {
    l1_hits: AtomicU64,
    l2_hits: AtomicU64,
    l3_hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStatistics {
    // == Constructor ==
    /// Creates a new CacheStatistics with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter for the tier that answered a read.
    pub fn record_hit(&self, level: TierLevel) {
        let counter = match level {
            TierLevel::Fast => &self.l1_hits,
            TierLevel::Scoped => &self.l2_hits,
            TierLevel::Durable => &self.l3_hits,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Increments the miss counter (all tiers exhausted).
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Write ==
    /// Increments the write counter, once per `set` regardless of how
    /// many tiers were touched.
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Evictions ==
    /// Adds an invalidation removal count to the eviction counter.
    pub fn record_evictions(&self, count: u64) {
        self.evictions.fetch_add(count, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Returns a point-in-time copy of the counters with derived fields.
    pub fn snapshot(&self) -> StatisticsSnapshot {
        let l1_hits = self.l1_hits.load(Ordering::Relaxed);
        let l2_hits = self.l2_hits.load(Ordering::Relaxed);
        let l3_hits = self.l3_hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total_hits = l1_hits + l2_hits + l3_hits;
        let requests = total_hits + misses;
        let hit_rate = if requests == 0 {
            0.0
        } else {
            total_hits as f64 / requests as f64 * 100.0
        };

        StatisticsSnapshot {
            l1_hits,
            l2_hits,
            l3_hits,
            misses,
            writes: self.writes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            total_hits,
            hit_rate,
        }
    }
}

// == Statistics Snapshot ==
/// Serializable view of the counters plus derived totals.
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsSnapshot {
    /// Hits answered by the fast tier
    pub l1_hits: u64,
    /// Hits answered by the scoped tier
    pub l2_hits: u64,
    /// Hits answered by the durable tier
    pub l3_hits: u64,
    /// Reads that exhausted every tier
    pub misses: u64,
    /// Number of `set` calls
    pub writes: u64,
    /// Entries removed through invalidation
    pub evictions: u64,
    /// Sum of the three hit counters
    pub total_hits: u64,
    /// total_hits / (total_hits + misses) as a percentage; 0 when idle
    pub hit_rate: f64,
}
