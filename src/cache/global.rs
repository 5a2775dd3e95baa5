//! Process-Wide Cache Accessor
//!
//! Lazily constructs one [`TieredCache`] per process behind a
//! check-lock-check accessor. Consumers should receive the engine by
//! `Arc` injection where feasible; this accessor exists for the
//! outermost composition boundary.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::TieredCache;
use crate::config::Config;
use crate::error::Result;

static INSTANCE: RwLock<Option<Arc<TieredCache>>> = RwLock::new(None);

// == Global Accessor ==
/// Returns the process-wide engine, constructing it on first call.
///
/// `config` is honored only by the call that performs the construction;
/// later callers get the existing instance regardless of what they pass.
/// Construction failure (an unusable durable directory) surfaces here
/// and leaves the slot empty so a corrected retry can succeed.
pub fn global(config: &Config) -> Result<Arc<TieredCache>> {
    if let Some(cache) = INSTANCE.read().as_ref() {
        return Ok(cache.clone());
    }

    let mut slot = INSTANCE.write();
    if let Some(cache) = slot.as_ref() {
        return Ok(cache.clone());
    }

    let cache = Arc::new(TieredCache::new(config)?);
    *slot = Some(cache.clone());
    Ok(cache)
}

// == Reset ==
/// Drops the singleton reference (not its contents) so the next
/// [`global`] call builds a fresh instance. Intended for test
/// isolation, not production use.
pub fn reset_global() {
    *INSTANCE.write() = None;
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    // One test covers the whole lifecycle: parallel test functions
    // would otherwise race on the shared slot.
    #[test]
    fn test_singleton_lifecycle() {
        reset_global();

        let first_config = Config {
            fast_tier_max_entries: 7,
            scoped_tier_enabled: false,
            durable_tier_enabled: false,
            ..Config::default()
        };
        let first = global(&first_config).unwrap();
        assert_eq!(first.statistics().tiers.fast.max_entries, 7);

        // A different configuration on a later call is ignored
        let second_config = Config {
            fast_tier_max_entries: 99,
            scoped_tier_enabled: false,
            durable_tier_enabled: false,
            ..Config::default()
        };
        let second = global(&second_config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.statistics().tiers.fast.max_entries, 7);

        // Reset clears the reference, not the old instance's contents
        first.set(
            "key1",
            serde_json::json!(1),
            crate::cache::SetOptions::default(),
        );
        reset_global();

        let third = global(&second_config).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.statistics().tiers.fast.max_entries, 99);
        assert_eq!(third.get("key1"), None);
        assert_eq!(first.get("key1"), Some(serde_json::json!(1)));

        reset_global();
    }
}
