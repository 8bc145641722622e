//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against simple reference models.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use crate::cache::{CacheStore, PolicyKind};

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Small key space so overwrites and hits happen often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]".prop_map(|s| s)
}

fn policy_strategy() -> impl Strategy<Value = PolicyKind> {
    prop_oneof![
        Just(PolicyKind::Lru),
        Just(PolicyKind::Lfu),
        Just(PolicyKind::Fifo),
    ]
}

/// A single cache operation
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String },
    Get { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        key_strategy().prop_map(|key| CacheOp::Put { key }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
    ]
}

fn put(store: &mut CacheStore, key: &str) -> Vec<String> {
    store.put(key.to_string(), format!("value_{}", key), None)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Every lookup is counted once, as a hit or a miss.
    #[test]
    fn prop_statistics_accuracy(
        policy in policy_strategy(),
        capacity in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut store = CacheStore::new(capacity, TEST_TTL, policy);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Put { key } => {
                    put(&mut store, &key);
                }
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
            }
            let stats = store.stats();
            prop_assert_eq!(stats.hits + stats.misses, stats.total_requests);
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.current_size, store.len(), "Size mismatch");
    }

    // Size never exceeds capacity and the eviction index mirrors the mapping.
    #[test]
    fn prop_capacity_and_index_sync(
        policy in policy_strategy(),
        capacity in 1usize..6,
        headroom in 0usize..3,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let mut store = CacheStore::new(capacity, TEST_TTL, policy).with_eviction_headroom(headroom);

        for op in ops {
            match op {
                CacheOp::Put { key } => {
                    put(&mut store, &key);
                }
                CacheOp::Get { key } => {
                    store.get(&key);
                }
            }

            prop_assert!(store.len() <= capacity, "Cache size {} exceeds max {}", store.len(), capacity);

            let indexed = store.eviction_order();
            prop_assert_eq!(indexed.len(), store.len());
            for key in &indexed {
                prop_assert!(store.contains_key(key), "Indexed key '{}' missing from mapping", key);
            }
        }
    }

    // FIFO evicts exactly the oldest inserted keys, regardless of reads.
    #[test]
    fn prop_fifo_evicts_oldest_inserted(
        capacity in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let mut store = CacheStore::new(capacity, TEST_TTL, PolicyKind::Fifo);
        let mut model: VecDeque<String> = VecDeque::new();

        for op in ops {
            match op {
                CacheOp::Put { key } => {
                    model.retain(|k| k != &key);
                    model.push_back(key.clone());
                    let mut expected = Vec::new();
                    while model.len() > capacity {
                        expected.extend(model.pop_front());
                    }

                    let evicted = put(&mut store, &key);
                    prop_assert_eq!(evicted, expected);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key).is_some(), model.contains(&key));
                }
            }
        }
    }

    // LRU evicts the key with the globally oldest last access.
    #[test]
    fn prop_lru_evicts_least_recent(
        capacity in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let mut store = CacheStore::new(capacity, TEST_TTL, PolicyKind::Lru);
        // Front = least recently used
        let mut model: VecDeque<String> = VecDeque::new();

        for op in ops {
            match op {
                CacheOp::Put { key } => {
                    model.retain(|k| k != &key);
                    model.push_back(key.clone());
                    let mut expected = Vec::new();
                    while model.len() > capacity {
                        expected.extend(model.pop_front());
                    }

                    let evicted = put(&mut store, &key);
                    prop_assert_eq!(evicted, expected);
                }
                CacheOp::Get { key } => {
                    let present = model.contains(&key);
                    if present {
                        model.retain(|k| k != &key);
                        model.push_back(key.clone());
                    }
                    prop_assert_eq!(store.get(&key).is_some(), present);
                }
            }
        }
    }

    // LFU evicts a key whose access count is minimal among the entries present.
    #[test]
    fn prop_lfu_evicts_least_frequent(
        capacity in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let mut store = CacheStore::new(capacity, TEST_TTL, PolicyKind::Lfu);
        let mut counts: HashMap<String, u64> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Put { key } => {
                    counts.insert(key.clone(), 1);
                    let before = counts.clone();

                    let evicted = put(&mut store, &key);
                    prop_assert!(evicted.len() <= 1);

                    if let Some(victim) = evicted.first() {
                        let victim_count = before[victim];
                        let min_count = before.values().copied().min().unwrap_or(0);
                        prop_assert_eq!(victim_count, min_count, "Victim '{}' was not least frequent", victim);
                        counts.remove(victim);
                    }
                }
                CacheOp::Get { key } => {
                    let hit = store.get(&key).is_some();
                    prop_assert_eq!(hit, counts.contains_key(&key));
                    if let Some(count) = counts.get_mut(&key) {
                        *count += 1;
                    }
                }
            }
        }

        let present: HashSet<String> = store.eviction_order().into_iter().collect();
        let modeled: HashSet<String> = counts.keys().cloned().collect();
        prop_assert_eq!(present, modeled);
    }
}

// Concurrent access through the shared lock keeps the store consistent.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn prop_concurrent_operation_correctness(
        policy in policy_strategy(),
        operations in prop::collection::vec(cache_op_strategy(), 10..60)
    ) {
        use std::sync::Arc;
        use tokio::sync::RwLock;

        let rt = tokio::runtime::Runtime::new().unwrap();
        let capacity = 4;

        rt.block_on(async {
            let store = Arc::new(RwLock::new(CacheStore::new(capacity, TEST_TTL, policy)));
            let mut handles = vec![];

            for op in operations {
                let store = Arc::clone(&store);
                handles.push(tokio::spawn(async move {
                    let mut cache = store.write().await;
                    match op {
                        CacheOp::Put { key } => {
                            put(&mut cache, &key);
                            None
                        }
                        CacheOp::Get { key } => cache.get(&key).map(|value| (key, value)),
                    }
                }));
            }

            for handle in handles {
                let read = handle.await.expect("Task should not panic");
                if let Some((key, value)) = read {
                    prop_assert_eq!(value, format!("value_{}", key));
                }
            }

            let cache = store.read().await;
            let stats = cache.stats();
            prop_assert!(stats.current_size <= capacity);
            prop_assert_eq!(stats.hits + stats.misses, stats.total_requests);
            prop_assert!((0.0..=1.0).contains(&stats.hit_rate()));
            Ok(())
        })?;
    }
}

// Separate block with few cases for time-sensitive TTL checks
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // A key read after its TTL elapsed is a miss, even if never evicted.
    #[test]
    fn prop_ttl_expiration_behavior(
        policy in policy_strategy(),
        key in key_strategy()
    ) {
        let mut store = CacheStore::new(100, TEST_TTL, policy);

        store.put(key.clone(), "value".to_string(), Some(Duration::from_millis(30)));
        prop_assert_eq!(store.get(&key), Some("value".to_string()));

        std::thread::sleep(Duration::from_millis(60));

        prop_assert_eq!(store.get(&key), None);
        prop_assert!(store.is_empty());
        prop_assert_eq!(store.stats().expirations, 1);
    }
}
