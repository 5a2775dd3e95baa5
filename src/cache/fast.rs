//! Fast Tier Module
//!
//! Lowest-latency tier: an in-process map bounded by entry count with
//! LRU eviction and lazy TTL expiry.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use serde::Serialize;

use crate::cache::CacheEntry;

// == LRU Order ==
/// Tracks access order for LRU eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug, Default)]
struct LruOrder {
    order: VecDeque<String>,
}

impl LruOrder {
    /// Marks a key as recently used (moves to front).
    fn touch(&mut self, key: &str) {
        self.remove(key);
        self.order.push_front(key.to_string());
    }

    /// Removes a key from the tracker.
    fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    /// Returns and removes the least recently used key.
    fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_back()
    }
}

// == Fast Tier ==
/// In-process cache tier with LRU eviction.
///
/// All state lives behind one tier-scoped mutex; the tier never calls
/// back into the orchestrator, so callers may block briefly on
/// contention but cannot deadlock.
#[derive(Debug)]
pub struct FastTier {
    inner: Mutex<FastTierInner>,
    /// Maximum number of entries before LRU eviction kicks in
    max_entries: usize,
    /// Byte-size budget; recorded as configuration but not consulted by
    /// eviction, which counts entries only
    #[allow(dead_code)]
    max_size_bytes: u64,
}

#[derive(Debug, Default)]
struct FastTierInner {
    entries: HashMap<String, CacheEntry>,
    order: LruOrder,
}

/// Occupancy snapshot for the fast tier.
#[derive(Debug, Clone, Serialize)]
pub struct FastTierUsage {
    pub entries: usize,
    pub max_entries: usize,
}

impl FastTier {
    // == Constructor ==
    /// Creates a new FastTier bounded by `max_entries`.
    pub fn new(max_entries: usize, max_size_bytes: u64) -> Self {
        Self {
            inner: Mutex::new(FastTierInner::default()),
            max_entries,
            max_size_bytes,
        }
    }

    // == Get ==
    /// Retrieves an entry by key.
    ///
    /// Expired entries are removed on sight. On a hit the key becomes
    /// most recently used and the entry's read counter is incremented.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let mut inner = self.inner.lock();

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return None,
        };
        if expired {
            inner.entries.remove(key);
            inner.order.remove(key);
            return None;
        }

        let entry = inner.entries.get_mut(key)?;
        entry.record_hit();
        let entry = entry.clone();
        inner.order.touch(key);
        Some(entry)
    }

    // == Set ==
    /// Stores an entry, evicting the least recently used one first when
    /// the tier is at capacity. Overwriting an existing key never evicts.
    ///
    /// Expired entries are not swept here; that happens on read or via
    /// [`FastTier::cleanup_expired`].
    pub fn set(&self, key: &str, entry: CacheEntry) {
        let mut inner = self.inner.lock();

        let is_overwrite = inner.entries.contains_key(key);
        if !is_overwrite && inner.entries.len() >= self.max_entries {
            if let Some(evicted) = inner.order.pop_oldest() {
                inner.entries.remove(&evicted);
            }
        }

        inner.entries.insert(key.to_string(), entry);
        inner.order.touch(key);
    }

    // == Invalidate ==
    /// Removes every entry whose key contains `pattern` as a substring
    /// or whose tag set intersects `tags`. Returns the number removed.
    ///
    /// With both selectors absent nothing is removed; that is `clear`'s
    /// job.
    pub fn invalidate(&self, pattern: Option<&str>, tags: Option<&[String]>) -> u64 {
        let mut inner = self.inner.lock();

        let matched: Vec<String> = inner
            .entries
            .iter()
            .filter(|(key, entry)| {
                pattern.is_some_and(|p| key.contains(p))
                    || tags.is_some_and(|t| entry.has_any_tag(t))
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in &matched {
            inner.entries.remove(key);
            inner.order.remove(key);
        }

        matched.len() as u64
    }

    // == Clear ==
    /// Removes everything unconditionally.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order = LruOrder::default();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries; returns the number removed.
    pub fn cleanup_expired(&self) -> u64 {
        let mut inner = self.inner.lock();

        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.entries.remove(key);
            inner.order.remove(key);
        }

        expired.len() as u64
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if the tier holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Usage ==
    /// Returns an occupancy snapshot.
    pub fn usage(&self) -> FastTierUsage {
        FastTierUsage {
            entries: self.len(),
            max_entries: self.max_entries,
        }
    }
}
