//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify the volatile store's accounting invariants under
//! arbitrary operation sequences.

use proptest::prelude::*;

use crate::cache::{CacheEntry, Priority, VolatileStore};

// == Test Configuration ==
const TEST_MEMORY_LIMIT: usize = 1024 * 1024;

// == Strategies ==
/// Generates valid cache keys (non-empty, bounded length)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,32}".prop_map(|s| s)
}

/// Generates serialized values of varied sizes
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,256}".prop_map(|s| s)
}

/// Generates a sequence of store operations for testing
#[derive(Debug, Clone)]
enum StoreOp {
    Put { key: String, value: String },
    Remove { key: String },
    Clear,
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        4 => (valid_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| StoreOp::Put { key, value }),
        2 => valid_key_strategy().prop_map(|key| StoreOp::Remove { key }),
        1 => Just(StoreOp::Clear),
    ]
}

fn entry(key: String, value: String) -> CacheEntry {
    CacheEntry::new(key, value, 300_000, Priority::Normal, vec![])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The aggregate memory counter always equals the exact sum of
    // `size_bytes` over the currently stored entries, for any sequence of
    // puts (including overwrites), removes, and clears. The counter is
    // maintained incrementally; this checks it against a full recount.
    #[test]
    fn prop_memory_accounting_matches_recount(ops in prop::collection::vec(store_op_strategy(), 1..80)) {
        let mut store = VolatileStore::new(TEST_MEMORY_LIMIT);

        for op in ops {
            match op {
                StoreOp::Put { key, value } => store.put(entry(key, value)),
                StoreOp::Remove { key } => {
                    let _ = store.remove(&key);
                }
                StoreOp::Clear => store.clear(),
            }

            let recount: usize = store.entries().iter().map(|e| e.size_bytes).sum();
            prop_assert_eq!(store.memory_usage(), recount, "Memory counter drifted from recount");
        }
    }

    // Entry count always matches the number of live keys, and removing a
    // key frees exactly the bytes that key was accounted for.
    #[test]
    fn prop_remove_frees_exact_size(key in valid_key_strategy(), value in valid_value_strategy()) {
        let mut store = VolatileStore::new(TEST_MEMORY_LIMIT);
        let size = value.len();
        store.put(entry(key.clone(), value));

        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.remove(&key), size, "Freed bytes mismatch");
        prop_assert_eq!(store.memory_usage(), 0);
        prop_assert!(store.is_empty());
    }

    // Overwriting a key keeps exactly one live entry and accounts for the
    // new size only (last-write-wins).
    #[test]
    fn prop_overwrite_is_last_write_wins(
        key in valid_key_strategy(),
        first in valid_value_strategy(),
        second in valid_value_strategy(),
    ) {
        let mut store = VolatileStore::new(TEST_MEMORY_LIMIT);
        store.put(entry(key.clone(), first));
        store.put(entry(key.clone(), second.clone()));

        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.get(&key).map(|e| e.value.clone()), Some(second.clone()));
        prop_assert_eq!(store.memory_usage(), second.len());
    }

    // Hit/miss counters reflect exactly the lookups performed against the
    // store through the recording API.
    #[test]
    fn prop_stats_counters_accurate(ops in prop::collection::vec(store_op_strategy(), 1..50)) {
        let mut store = VolatileStore::new(TEST_MEMORY_LIMIT);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                StoreOp::Put { key, value } => store.put(entry(key, value)),
                StoreOp::Remove { key } => {
                    // Model the manager's lookup before invalidation
                    if store.get(&key).is_some() {
                        store.record_hit();
                        expected_hits += 1;
                    } else {
                        store.record_miss();
                        expected_misses += 1;
                    }
                    let _ = store.remove(&key);
                }
                StoreOp::Clear => {
                    store.clear();
                    expected_hits = 0;
                    expected_misses = 0;
                }
            }
        }

        let stats = store.stats(crate::cache::current_timestamp_ms());
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.entry_count, store.len(), "Entry count mismatch");
    }

    // A snapshot taken before mutations never changes: copy-on-iterate.
    #[test]
    fn prop_snapshot_is_stable_under_mutation(
        keys in prop::collection::hash_set(valid_key_strategy(), 1..10),
    ) {
        let mut store = VolatileStore::new(TEST_MEMORY_LIMIT);
        for key in &keys {
            store.put(entry(key.clone(), "v".to_string()));
        }

        let snapshot = store.entries();
        let snapshot_len = snapshot.len();

        for key in &keys {
            store.remove(key);
        }

        prop_assert_eq!(snapshot.len(), snapshot_len);
        prop_assert_eq!(snapshot_len, keys.len());
        prop_assert!(store.is_empty());
    }
}
