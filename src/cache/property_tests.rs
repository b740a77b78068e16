//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against expiry, capacity and
//! persistence properties.

use proptest::prelude::*;
use std::collections::HashSet;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::CacheStore;
use crate::config::{CacheConfig, StorageKind};
use crate::storage::SessionStore;

// == Test Configuration ==
const TEST_MAX_SIZE: usize = 100;
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,32}"
}

/// Generates cache values
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

/// Distinct keys, preserving first-seen order
fn distinct_keys(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|k| seen.insert(k.clone())).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Statistics count every get as exactly one hit or one miss.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::in_memory(TEST_MAX_SIZE, TEST_DEFAULT_TTL);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, None),
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.size, store.len(), "Size mismatch");
        prop_assert_eq!(stats.entries.len(), store.len());
    }

    // Before its ttl elapses, a stored value reads back unchanged.
    #[test]
    fn prop_value_readable_before_expiry(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::in_memory(TEST_MAX_SIZE, TEST_DEFAULT_TTL);

        store.set(key.clone(), value.clone(), Some(Duration::from_secs(60)));

        prop_assert_eq!(store.get(&key), Some(value));
    }

    // A later set under the same key replaces the value wholesale.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut store = CacheStore::in_memory(TEST_MAX_SIZE, TEST_DEFAULT_TTL);

        store.set(key.clone(), value1, None);
        store.set(key.clone(), value2.clone(), None);

        prop_assert_eq!(store.get(&key), Some(value2));
        prop_assert_eq!(store.len(), 1, "Should have exactly one entry after overwrite");
    }

    // Size never exceeds capacity, whatever is written.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..200)
    ) {
        let max_size = 50;
        let mut store = CacheStore::in_memory(max_size, TEST_DEFAULT_TTL);

        for (key, value) in entries {
            store.set(key, value, None);
            prop_assert!(
                store.len() <= max_size,
                "Cache size {} exceeds max {}",
                store.len(),
                max_size
            );
        }
    }

    // Inserting max_size + 1 distinct keys evicts exactly the first one,
    // regardless of reads in between.
    #[test]
    fn prop_oldest_inserted_evicted(
        keys in prop::collection::vec(key_strategy(), 3..12),
        reads in prop::collection::vec(0usize..12, 0..10),
        new_key in key_strategy()
    ) {
        let unique_keys = distinct_keys(keys);
        prop_assume!(unique_keys.len() >= 2);
        prop_assume!(!unique_keys.contains(&new_key));

        let capacity = unique_keys.len();
        let mut store = CacheStore::in_memory(capacity, TEST_DEFAULT_TTL);

        for key in &unique_keys {
            store.set(key.clone(), format!("value_{}", key), None);
        }
        for index in reads {
            store.get(&unique_keys[index % capacity]);
        }

        store.set(new_key.clone(), "new".to_string(), None);

        prop_assert_eq!(store.len(), capacity);
        prop_assert!(!store.has(&unique_keys[0]), "Oldest key should have been evicted");
        prop_assert!(store.has(&new_key));
        for key in unique_keys.iter().skip(1) {
            prop_assert!(store.has(key), "Key '{}' should still exist", key);
        }
        prop_assert_eq!(store.stats().evictions, 1);
    }

    // A restored snapshot holds the same keys, in the same order, with the same values.
    #[test]
    fn prop_snapshot_restores_contents(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..30)
    ) {
        let session = SessionStore::new();
        let config = CacheConfig::default()
            .with_storage(StorageKind::Session(session))
            .with_max_size(TEST_MAX_SIZE);

        let mut original = CacheStore::new(&config);
        for (key, value) in entries {
            original.set(key, value, None);
        }

        let mut restored: CacheStore<String> = CacheStore::new(&config);
        let keys = original.keys();
        prop_assert_eq!(restored.len(), original.len());
        for key in &keys {
            prop_assert_eq!(restored.get(key), original.get(key));
        }
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // Once the ttl has elapsed, the next read misses and removes the entry.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in key_strategy(),
        value in value_strategy(),
        use_has in any::<bool>()
    ) {
        let mut store = CacheStore::in_memory(TEST_MAX_SIZE, TEST_DEFAULT_TTL);

        store.set(key.clone(), value.clone(), Some(Duration::from_millis(40)));
        prop_assert_eq!(store.get(&key), Some(value), "Value should match before expiration");

        sleep(Duration::from_millis(70));

        // Expiry is lazy: still held until touched
        prop_assert_eq!(store.len(), 1);
        if use_has {
            prop_assert!(!store.has(&key));
        } else {
            prop_assert_eq!(store.get(&key), None);
        }
        prop_assert_eq!(store.len(), 0);
    }
}
