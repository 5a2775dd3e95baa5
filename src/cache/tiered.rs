//! Tiered Cache Orchestrator
//!
//! Composes the fast, scoped, and durable tiers behind one
//! read/write/invalidate contract and owns the aggregate statistics.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{
    CacheEntry, CacheStatistics, DurableTier, FastTier, FastTierUsage, PersistentTier,
    PersistentUsage, ScopedTier, ScopedTierUsage, StatisticsSnapshot, TierLevel,
    DEFAULT_TTL_SECONDS,
};
use crate::config::Config;
use crate::error::Result;

// == Set Options ==
/// Per-write parameters for [`TieredCache::set`].
#[derive(Debug, Clone)]
pub struct SetOptions {
    /// Entry lifetime in seconds
    pub ttl_seconds: i64,
    /// Invalidation tags attached to the entry
    pub tags: Vec<String>,
    /// Whether the write also goes to the durable tier
    pub persistent: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
            tags: Vec::new(),
            persistent: false,
        }
    }
}

impl SetOptions {
    /// Options with a specific TTL and the remaining defaults.
    pub fn ttl(ttl_seconds: i64) -> Self {
        Self {
            ttl_seconds,
            ..Self::default()
        }
    }

    /// Attaches invalidation tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Marks the write as durable.
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }
}

// == Tier Usages ==
/// Per-tier occupancy, part of the statistics report.
#[derive(Debug, Clone, Serialize)]
pub struct TierUsages {
    pub fast: FastTierUsage,
    pub scoped: Option<ScopedTierUsage>,
    pub durable: Option<PersistentUsage>,
}

// == Cache Report ==
/// Aggregate counters plus per-tier occupancy.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    #[serde(flatten)]
    pub counters: StatisticsSnapshot,
    pub tiers: TierUsages,
}

// == Tiered Cache ==
/// The cache engine: a mandatory fast tier, plus optional scoped and
/// durable tiers selected by configuration.
///
/// Reads probe fast → scoped → durable and promote a hit into every
/// faster enabled tier. Writes always land in the fast tier (and the
/// scoped tier when enabled); the durable tier is written only for
/// persistent writes.
///
/// The orchestrator holds no lock of its own: each tier guards its own
/// state, and tier locks are taken one at a time, never nested, so the
/// probe/promote sequence is not atomic. Two racing readers may both
/// promote the same entry; the second write simply overwrites the first
/// with an equivalent entry.
#[derive(Debug)]
pub struct TieredCache {
    fast: FastTier,
    scoped: Option<ScopedTier>,
    persistent: Option<Box<dyn PersistentTier>>,
    stats: CacheStatistics,
}

impl TieredCache {
    // == Constructor ==
    /// Builds the engine from configuration.
    ///
    /// The only fallible step is preparing the durable tier's directory;
    /// that error surfaces here rather than being downgraded to misses.
    pub fn new(config: &Config) -> Result<Self> {
        let fast = FastTier::new(
            config.fast_tier_max_entries,
            config.fast_tier_max_size_mb * 1024 * 1024,
        );
        let scoped = config.scoped_tier_enabled.then(ScopedTier::new);
        let persistent: Option<Box<dyn PersistentTier>> = if config.durable_tier_enabled {
            Some(Box::new(DurableTier::new(
                &config.durable_tier_directory,
                config.durable_tier_max_size_mb * 1024 * 1024,
            )?))
        } else {
            None
        };

        Ok(Self {
            fast,
            scoped,
            persistent,
            stats: CacheStatistics::new(),
        })
    }

    /// Replaces the durable slot, e.g. with a
    /// [`RemoteTierAdapter`](crate::cache::RemoteTierAdapter) peer.
    pub fn with_persistent_tier(mut self, tier: Box<dyn PersistentTier>) -> Self {
        self.persistent = Some(tier);
        self
    }

    /// The scoped tier, for owners that bind and unbind scope stores.
    pub fn scoped_tier(&self) -> Option<&ScopedTier> {
        self.scoped.as_ref()
    }

    // == Get ==
    /// Read-through lookup with promotion.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_with(key, true)
    }

    /// Read-through lookup returning `default` on a miss.
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    /// Read-through lookup; `promote` controls whether a hit in a slower
    /// tier is copied into every faster enabled tier.
    pub fn get_with(&self, key: &str, promote: bool) -> Option<Value> {
        if let Some(entry) = self.fast.get(key) {
            self.stats.record_hit(TierLevel::Fast);
            return Some(entry.value);
        }

        if let Some(scoped) = &self.scoped {
            if let Some(entry) = scoped.get(key) {
                self.stats.record_hit(TierLevel::Scoped);
                if promote {
                    self.fast.set(key, entry.clone());
                }
                return Some(entry.value);
            }
        }

        if let Some(persistent) = &self.persistent {
            if let Some(entry) = persistent.get(key) {
                self.stats.record_hit(TierLevel::Durable);
                if promote {
                    if let Some(scoped) = &self.scoped {
                        scoped.set(key, &entry);
                    }
                    self.fast.set(key, entry.clone());
                }
                return Some(entry.value);
            }
        }

        self.stats.record_miss();
        None
    }

    // == Set ==
    /// Write-through store.
    ///
    /// One fresh entry is constructed and written to the fast tier (and
    /// the scoped tier when enabled); the durable tier is written only
    /// when the options mark the write persistent. The write counter
    /// moves once regardless of how many tiers were touched.
    pub fn set(&self, key: &str, value: Value, options: SetOptions) {
        let entry = CacheEntry::new(value, options.ttl_seconds, options.tags);

        if let Some(scoped) = &self.scoped {
            scoped.set(key, &entry);
        }
        if options.persistent {
            if let Some(persistent) = &self.persistent {
                persistent.set(key, &entry);
            }
        }
        self.fast.set(key, entry);

        self.stats.record_write();
    }

    // == Invalidate ==
    /// Removes matching entries from every enabled tier and returns the
    /// summed count, which is also added to the eviction counter.
    ///
    /// Tiers are invalidated independently; a tier that fails internally
    /// absorbs the failure and reports what it did remove.
    pub fn invalidate(&self, pattern: Option<&str>, tags: Option<&[String]>) -> u64 {
        let mut removed = self.fast.invalidate(pattern, tags);
        if let Some(scoped) = &self.scoped {
            removed += scoped.invalidate(pattern, tags);
        }
        if let Some(persistent) = &self.persistent {
            removed += persistent.invalidate(pattern, tags);
        }

        self.stats.record_evictions(removed);
        removed
    }

    // == Clear ==
    /// Wipes the selected tiers unconditionally.
    pub fn clear(&self, levels: &[TierLevel]) {
        for level in levels {
            match level {
                TierLevel::Fast => self.fast.clear(),
                TierLevel::Scoped => {
                    if let Some(scoped) = &self.scoped {
                        scoped.clear();
                    }
                }
                TierLevel::Durable => {
                    if let Some(persistent) = &self.persistent {
                        persistent.clear();
                    }
                }
            }
        }
    }

    /// Wipes every tier.
    pub fn clear_all(&self) {
        self.clear(&[TierLevel::Fast, TierLevel::Scoped, TierLevel::Durable]);
    }

    // == Get Or Compute ==
    /// Cache-aside combinator: returns the cached value, or runs
    /// `compute`, stores its result, and returns it.
    ///
    /// A compute error propagates unmodified and nothing is cached. No
    /// per-key coordination is performed: concurrent callers racing on
    /// the same missing key may each invoke `compute`, and the last
    /// store wins.
    pub fn get_or_compute<F, E>(&self, key: &str, options: SetOptions, compute: F) -> Result<Value, E>
    where
        F: FnOnce() -> Result<Value, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = compute()?;
        self.set(key, value.clone(), options);
        Ok(value)
    }

    // == Cleanup Expired ==
    /// Sweeps expired entries from every enabled tier; returns the
    /// summed count. Intended for periodic maintenance.
    pub fn cleanup_expired(&self) -> u64 {
        let mut removed = self.fast.cleanup_expired();
        if let Some(scoped) = &self.scoped {
            removed += scoped.cleanup_expired();
        }
        if let Some(persistent) = &self.persistent {
            removed += persistent.cleanup_expired();
        }
        removed
    }

    // == Statistics ==
    /// Returns the aggregate counters plus each tier's occupancy.
    pub fn statistics(&self) -> CacheReport {
        CacheReport {
            counters: self.stats.snapshot(),
            tiers: TierUsages {
                fast: self.fast.usage(),
                scoped: self.scoped.as_ref().map(ScopedTier::usage),
                durable: self.persistent.as_ref().map(|tier| tier.usage()),
            },
        }
    }
}
