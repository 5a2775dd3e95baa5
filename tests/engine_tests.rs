//! Integration Tests for the Cache Engine
//!
//! Exercises cross-tier behavior: promotion, persistence across
//! restarts, tag invalidation fan-out, and concurrent cache-aside use.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use strata::cache::{ScopeStore, TierLevel};
use strata::{Config, SetOptions, TieredCache};
use tempfile::TempDir;

fn full_config(dir: &TempDir) -> Config {
    Config {
        fast_tier_max_entries: 100,
        scoped_tier_enabled: true,
        durable_tier_enabled: true,
        durable_tier_directory: dir.path().to_path_buf(),
        durable_tier_max_size_mb: 1,
        ..Config::default()
    }
}

fn full_cache(dir: &TempDir) -> TieredCache {
    TieredCache::new(&full_config(dir)).unwrap()
}

// == Promotion ==

#[test]
fn test_durable_hit_promotes_into_faster_tiers() {
    let dir = TempDir::new().unwrap();
    let cache = full_cache(&dir);
    let store = Arc::new(ScopeStore::new());
    cache.scoped_tier().unwrap().bind(store.clone());

    cache.set("key1", json!("durable"), SetOptions::default().persistent());

    // Wipe the faster tiers so only the durable copy remains
    cache.clear(&[TierLevel::Fast, TierLevel::Scoped]);
    assert_eq!(store.len(), 0);

    // First read is answered by the durable tier and promoted
    assert_eq!(cache.get("key1"), Some(json!("durable")));
    let counters = cache.statistics().counters;
    assert_eq!(counters.l3_hits, 1);
    assert_eq!(counters.l1_hits, 0);
    assert_eq!(store.len(), 1, "promotion should populate the scoped tier");

    // Second read is answered by the fast tier
    assert_eq!(cache.get("key1"), Some(json!("durable")));
    let counters = cache.statistics().counters;
    assert_eq!(counters.l1_hits, 1);
    assert_eq!(counters.l3_hits, 1);
}

#[test]
fn test_scoped_hit_promotes_only_into_fast_tier() {
    let dir = TempDir::new().unwrap();
    let cache = full_cache(&dir);
    cache.scoped_tier().unwrap().bind(Arc::new(ScopeStore::new()));

    cache.set("key1", json!(1), SetOptions::default());
    cache.clear(&[TierLevel::Fast]);

    assert_eq!(cache.get("key1"), Some(json!(1)));
    assert_eq!(cache.statistics().counters.l2_hits, 1);

    assert_eq!(cache.get("key1"), Some(json!(1)));
    assert_eq!(cache.statistics().counters.l1_hits, 1);
}

// == Round-Trip Persistence ==

#[test]
fn test_persistent_write_survives_restart() {
    let dir = TempDir::new().unwrap();

    {
        let cache = full_cache(&dir);
        cache.set(
            "stable",
            json!({"answer": 42}),
            SetOptions::ttl(600)
                .with_tags(vec!["report".to_string()])
                .persistent(),
        );
    }

    // Simulated process restart: a fresh engine over the same directory
    let cache = full_cache(&dir);
    assert_eq!(cache.get("stable"), Some(json!({"answer": 42})));
    assert_eq!(cache.statistics().counters.l3_hits, 1);
}

#[test]
fn test_non_persistent_write_does_not_survive_restart() {
    let dir = TempDir::new().unwrap();

    {
        let cache = full_cache(&dir);
        cache.set("volatile", json!(1), SetOptions::default());
    }

    let cache = full_cache(&dir);
    assert_eq!(cache.get("volatile"), None);
    assert_eq!(cache.statistics().counters.misses, 1);
}

// == Tag Invalidation Fan-Out ==

#[test]
fn test_tag_invalidation_spans_all_tiers() {
    let dir = TempDir::new().unwrap();
    let cache = full_cache(&dir);
    cache.scoped_tier().unwrap().bind(Arc::new(ScopeStore::new()));

    cache.set(
        "a",
        json!(1),
        SetOptions::default()
            .with_tags(vec!["users".to_string()])
            .persistent(),
    );
    cache.set(
        "b",
        json!(2),
        SetOptions::default().with_tags(vec!["users".to_string()]),
    );
    cache.set("c", json!(3), SetOptions::default().persistent());

    // "a" lives in fast+scoped+durable (3 copies), "b" in fast+scoped (2)
    let removed = cache.invalidate(None, Some(&["users".to_string()]));
    assert_eq!(removed, 5);
    assert_eq!(cache.statistics().counters.evictions, 5);

    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.get("c"), Some(json!(3)));
}

#[test]
fn test_pattern_invalidation_cannot_reach_durable_tier() {
    let dir = TempDir::new().unwrap();
    let cache = full_cache(&dir);

    cache.set("user:1", json!(1), SetOptions::default().persistent());

    // The fast copy matches the pattern; the durable file cannot, its
    // name being a one-way hash
    let removed = cache.invalidate(Some("user:"), None);
    assert_eq!(removed, 1);

    // The durable copy is still readable
    assert_eq!(cache.get("user:1"), Some(json!(1)));
    assert_eq!(cache.statistics().counters.l3_hits, 1);
}

// == Expiry Sweep ==

#[test]
fn test_cleanup_expired_spans_all_tiers() {
    let dir = TempDir::new().unwrap();
    let cache = full_cache(&dir);
    cache.scoped_tier().unwrap().bind(Arc::new(ScopeStore::new()));

    cache.set("short", json!(1), SetOptions::ttl(1).persistent());
    cache.set("long", json!(2), SetOptions::ttl(600).persistent());

    std::thread::sleep(Duration::from_millis(1100));

    // One expired entry in each of fast, scoped, durable
    assert_eq!(cache.cleanup_expired(), 3);
    assert_eq!(cache.get("long"), Some(json!(2)));
}

// == Concurrent Cache-Aside ==

#[test]
fn test_concurrent_get_or_compute_converges() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(full_cache(&dir));
    let compute_calls = Arc::new(AtomicUsize::new(0));

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let compute_calls = Arc::clone(&compute_calls);
            scope.spawn(move || {
                let value = cache
                    .get_or_compute::<_, ()>("slow_key", SetOptions::default(), || {
                        compute_calls.fetch_add(1, Ordering::SeqCst);
                        // Slow computation widens the race window
                        std::thread::sleep(Duration::from_millis(50));
                        Ok(json!("computed"))
                    })
                    .unwrap();
                assert_eq!(value, json!("computed"));
            });
        }
    });

    // Without per-key coordination every racer may compute, but at
    // least one did and all observed the same value
    let calls = compute_calls.load(Ordering::SeqCst);
    assert!((1..=8).contains(&calls));

    // Exactly one cached value remains
    assert_eq!(cache.get("slow_key"), Some(json!("computed")));
    assert_eq!(cache.statistics().tiers.fast.entries, 1);
}
