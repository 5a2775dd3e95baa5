//! Scoped Tier Module
//!
//! Overlay tier with the same read/write/invalidate contract as the fast
//! tier, backed by an externally-owned key-value bag that lives and dies
//! with a logical session or request scope.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::cache::CacheEntry;

// == Scope Store ==
/// Externally-owned string bag, one per logical scope.
///
/// The owner creates it when the scope opens and drops it when the scope
/// ends; the tier only borrows it. The inner map is allocated lazily on
/// first touch.
#[derive(Debug, Default)]
pub struct ScopeStore {
    section: Mutex<Option<HashMap<String, String>>>,
}

impl ScopeStore {
    /// Creates an empty, uninitialized store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the backing map, initializing it on first use.
    fn with<R>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> R) -> R {
        let mut guard = self.section.lock();
        f(guard.get_or_insert_with(HashMap::new))
    }

    /// Returns the number of stored values without forcing initialization.
    pub fn len(&self) -> usize {
        self.section.lock().as_ref().map_or(0, HashMap::len)
    }

    /// Returns true if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Scoped Tier ==
/// Session-scoped cache tier.
///
/// Entries cross a JSON boundary in both directions; a value that does
/// not round-trip cleanly is treated as absent. While no scope is bound
/// every operation degrades silently to a no-op or a miss.
#[derive(Debug, Default)]
pub struct ScopedTier {
    scope: RwLock<Option<Arc<ScopeStore>>>,
}

/// Occupancy snapshot for the scoped tier.
#[derive(Debug, Clone, Serialize)]
pub struct ScopedTierUsage {
    /// Whether a scope is currently bound
    pub active: bool,
    pub entries: usize,
}

impl ScopedTier {
    // == Constructor ==
    /// Creates a tier with no scope bound.
    pub fn new() -> Self {
        Self::default()
    }

    // == Scope Binding ==
    /// Attaches the externally-owned store for the current scope.
    pub fn bind(&self, store: Arc<ScopeStore>) {
        *self.scope.write() = Some(store);
    }

    /// Detaches the current scope; subsequent operations become no-ops.
    pub fn unbind(&self) {
        *self.scope.write() = None;
    }

    /// Returns true while a scope is bound.
    pub fn is_active(&self) -> bool {
        self.scope.read().is_some()
    }

    fn current(&self) -> Option<Arc<ScopeStore>> {
        self.scope.read().clone()
    }

    // == Get ==
    /// Retrieves an entry by key, a miss when unbound.
    ///
    /// Expired entries are removed on sight; payloads that fail to
    /// deserialize are treated as absent. The read counter is
    /// incremented on the returned copy only.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let store = self.current()?;
        let raw = store.with(|map| map.get(key).cloned())?;

        let mut entry: CacheEntry = serde_json::from_str(&raw).ok()?;
        if entry.is_expired() {
            store.with(|map| map.remove(key));
            return None;
        }

        entry.record_hit();
        Some(entry)
    }

    // == Set ==
    /// Stores an entry, silently doing nothing when unbound or when the
    /// entry cannot be serialized.
    pub fn set(&self, key: &str, entry: &CacheEntry) {
        let Some(store) = self.current() else {
            return;
        };
        if let Ok(raw) = serde_json::to_string(entry) {
            store.with(|map| {
                map.insert(key.to_string(), raw);
            });
        }
    }

    // == Invalidate ==
    /// Removes every entry whose key contains `pattern` or whose tags
    /// intersect `tags`; returns the number removed (0 when unbound).
    pub fn invalidate(&self, pattern: Option<&str>, tags: Option<&[String]>) -> u64 {
        let Some(store) = self.current() else {
            return 0;
        };

        store.with(|map| {
            let matched: Vec<String> = map
                .iter()
                .filter(|(key, raw)| {
                    if pattern.is_some_and(|p| key.contains(p)) {
                        return true;
                    }
                    match tags {
                        Some(t) => serde_json::from_str::<CacheEntry>(raw)
                            .map(|entry| entry.has_any_tag(t))
                            .unwrap_or(false),
                        None => false,
                    }
                })
                .map(|(key, _)| key.clone())
                .collect();

            for key in &matched {
                map.remove(key);
            }
            matched.len() as u64
        })
    }

    // == Clear ==
    /// Removes everything in the bound scope; no-op when unbound.
    pub fn clear(&self) {
        if let Some(store) = self.current() {
            store.with(HashMap::clear);
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries; returns the number removed.
    pub fn cleanup_expired(&self) -> u64 {
        let Some(store) = self.current() else {
            return 0;
        };

        store.with(|map| {
            let expired: Vec<String> = map
                .iter()
                .filter(|(_, raw)| {
                    serde_json::from_str::<CacheEntry>(raw)
                        .map(|entry| entry.is_expired())
                        .unwrap_or(false)
                })
                .map(|(key, _)| key.clone())
                .collect();

            for key in &expired {
                map.remove(key);
            }
            expired.len() as u64
        })
    }

    // == Usage ==
    /// Returns an occupancy snapshot.
    pub fn usage(&self) -> ScopedTierUsage {
        match self.current() {
            Some(store) => ScopedTierUsage {
                active: true,
                entries: store.len(),
            },
            None => ScopedTierUsage {
                active: false,
                entries: 0,
            },
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    fn bound_tier() -> (ScopedTier, Arc<ScopeStore>) {
        let tier = ScopedTier::new();
        let store = Arc::new(ScopeStore::new());
        tier.bind(store.clone());
        (tier, store)
    }

    #[test]
    fn test_unbound_operations_are_noops() {
        let tier = ScopedTier::new();
        let entry = CacheEntry::new(json!(1), 300, []);

        tier.set("key1", &entry);
        assert!(tier.get("key1").is_none());
        assert_eq!(tier.invalidate(Some("key"), None), 0);
        assert_eq!(tier.cleanup_expired(), 0);
        tier.clear();
        assert!(!tier.is_active());
    }

    #[test]
    fn test_round_trip_through_scope() {
        let (tier, _store) = bound_tier();
        let entry = CacheEntry::new(json!({"n": 42}), 300, ["t".to_string()]);

        tier.set("key1", &entry);
        let found = tier.get("key1").unwrap();

        assert_eq!(found.value, entry.value);
        assert_eq!(found.tags, entry.tags);
        assert_eq!(found.ttl_seconds, entry.ttl_seconds);
        assert_eq!(found.hits, 1);
    }

    #[test]
    fn test_expired_entry_removed_on_get() {
        let (tier, store) = bound_tier();
        tier.set("key1", &CacheEntry::new(json!(1), 1, []));

        sleep(Duration::from_millis(1100));

        assert!(tier.get("key1").is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_corrupt_payload_is_a_miss() {
        let (tier, store) = bound_tier();
        store.with(|map| {
            map.insert("bad".to_string(), "not json".to_string());
        });

        assert!(tier.get("bad").is_none());
    }

    #[test]
    fn test_invalidate_pattern_and_tags() {
        let (tier, _store) = bound_tier();
        tier.set("user:1", &CacheEntry::new(json!(1), 300, []));
        tier.set(
            "report:1",
            &CacheEntry::new(json!(2), 300, ["hot".to_string()]),
        );
        tier.set("other", &CacheEntry::new(json!(3), 300, []));

        let removed = tier.invalidate(Some("user:"), Some(&["hot".to_string()]));

        assert_eq!(removed, 2);
        assert!(tier.get("user:1").is_none());
        assert!(tier.get("report:1").is_none());
        assert!(tier.get("other").is_some());
    }

    #[test]
    fn test_scope_discarded_by_owner() {
        let tier = ScopedTier::new();
        let store = Arc::new(ScopeStore::new());
        tier.bind(store);

        tier.set("key1", &CacheEntry::new(json!(1), 300, []));
        assert!(tier.get("key1").is_some());

        // Owner ends the scope
        tier.unbind();
        assert!(tier.get("key1").is_none());
    }

    #[test]
    fn test_usage() {
        let (tier, _store) = bound_tier();
        tier.set("key1", &CacheEntry::new(json!(1), 300, []));

        let usage = tier.usage();
        assert!(usage.active);
        assert_eq!(usage.entries, 1);

        tier.unbind();
        let usage = tier.usage();
        assert!(!usage.active);
        assert_eq!(usage.entries, 0);
    }
}
