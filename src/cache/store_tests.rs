use super::store::{CacheStore, CacheStoreHandle};
use crate::hashing::{CacheKey, CacheKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const TTL: Duration = Duration::from_secs(60);

fn key(text: &str) -> CacheKey {
    CacheKey::new(CacheKind::Embedding, text)
}

#[test]
fn test_store_new_is_empty() {
    let store: CacheStore<u32> = CacheStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert_eq!(store.max_size(), 1000);
    assert_eq!(store.default_ttl(), Duration::from_secs(3600));
}

#[test]
fn test_insert_and_get() {
    let store = CacheStore::with_config(10, TTL);
    assert!(store.insert(key("a"), 1u32, TTL));

    assert_eq!(store.get(&key("a")), Some(1));
    assert_eq!(store.get(&key("A  ")), Some(1), "normalized text shares the key");
    assert_eq!(store.get(&key("b")), None);

    let stats = store.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.current_size, 1);
}

#[test]
fn test_insert_replaces_existing_without_eviction() {
    let store = CacheStore::with_config(2, TTL);
    store.insert(key("a"), 1u32, TTL);
    store.insert(key("b"), 2, TTL);
    store.insert(key("a"), 10, TTL);

    assert_eq!(store.len(), 2);
    assert_eq!(store.stats().evictions, 0);
    assert_eq!(store.peek(&key("a")), Some(10));
    assert_eq!(store.peek(&key("b")), Some(2));
}

#[test]
fn test_lru_evicts_oldest_insertion() {
    let store = CacheStore::with_config(3, TTL);
    for (i, k) in ["A", "B", "C", "D"].iter().enumerate() {
        store.insert(key(k), i, TTL);
    }

    assert_eq!(store.len(), 3);
    assert!(!store.contains(&key("A")));
    assert!(store.contains(&key("B")));
    assert!(store.contains(&key("C")));
    assert!(store.contains(&key("D")));
    assert_eq!(store.stats().evictions, 1);
}

#[test]
fn test_lru_reaccess_protects_entry() {
    let store = CacheStore::with_config(3, TTL);
    store.insert(key("A"), 0u32, TTL);
    store.insert(key("B"), 1, TTL);
    store.insert(key("C"), 2, TTL);

    assert_eq!(store.get(&key("A")), Some(0));
    store.insert(key("D"), 3, TTL);

    assert!(store.contains(&key("A")));
    assert!(!store.contains(&key("B")));
    assert!(store.contains(&key("C")));
    assert!(store.contains(&key("D")));
}

#[test]
fn test_reinsert_refreshes_recency() {
    let store = CacheStore::with_config(3, TTL);
    store.insert(key("A"), 0u32, TTL);
    store.insert(key("B"), 1, TTL);
    store.insert(key("C"), 2, TTL);

    store.insert(key("A"), 10, TTL);
    store.insert(key("D"), 3, TTL);

    assert_eq!(store.peek(&key("A")), Some(10));
    assert!(!store.contains(&key("B")));
    assert_eq!(store.stats().evictions, 1);
}

#[test]
fn test_peek_does_not_refresh_recency() {
    let store = CacheStore::with_config(2, TTL);
    store.insert(key("A"), 0u32, TTL);
    store.insert(key("B"), 1, TTL);

    assert_eq!(store.peek(&key("A")), Some(0));
    store.insert(key("C"), 2, TTL);

    assert!(!store.contains(&key("A")));
    assert_eq!(store.stats().hits, 0);
}

#[tokio::test(start_paused = true)]
async fn test_ttl_boundary() {
    let store = CacheStore::with_config(10, TTL);
    store.insert(key("a"), 7u32, TTL);

    tokio::time::advance(TTL - Duration::from_millis(1)).await;
    assert_eq!(store.get(&key("a")), Some(7));

    tokio::time::advance(Duration::from_millis(2)).await;
    assert_eq!(store.get(&key("a")), None);

    let stats = store.stats();
    assert_eq!(stats.expirations, 1);
    assert_eq!(stats.current_size, 0, "expired entry is physically removed");
}

#[tokio::test(start_paused = true)]
async fn test_hit_does_not_extend_ttl() {
    let store = CacheStore::with_config(10, TTL);
    store.insert(key("a"), 7u32, TTL);

    tokio::time::advance(Duration::from_secs(50)).await;
    assert_eq!(store.get(&key("a")), Some(7));

    tokio::time::advance(Duration::from_secs(11)).await;
    assert_eq!(store.get(&key("a")), None);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_hidden_from_peek_and_contains() {
    let store = CacheStore::with_config(10, TTL);
    store.insert(key("a"), 1u32, Duration::from_secs(1));

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(!store.contains(&key("a")));
    assert_eq!(store.peek(&key("a")), None);
    assert_eq!(store.len(), 1, "peek does not remove");
}

#[tokio::test(start_paused = true)]
async fn test_purge_expired() {
    let store = CacheStore::with_config(10, TTL);
    store.insert(key("short"), 1u32, Duration::from_secs(1));
    store.insert(key("long"), 2, Duration::from_secs(100));

    tokio::time::advance(Duration::from_secs(5)).await;
    assert_eq!(store.purge_expired(), 1);
    assert_eq!(store.len(), 1);
    assert!(store.contains(&key("long")));
    assert_eq!(store.stats().expirations, 1);
}

#[tokio::test]
async fn test_get_or_compute_miss_then_hit() {
    let store = CacheStore::with_config(10, TTL);
    let calls = AtomicUsize::new(0);
    let counter = &calls;

    let compute = move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(42u32)
    };

    let (value, hit) = store.get_or_compute(&key("x"), TTL, compute).await.unwrap();
    assert_eq!((value, hit), (42, false));

    let (value, hit) = store
        .get_or_compute(&key("x"), TTL, || async { Ok::<_, String>(0u32) })
        .await
        .unwrap();
    assert_eq!((value, hit), (42, true));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_or_compute_failure_writes_nothing() {
    let store: CacheStore<u32> = CacheStore::with_config(10, TTL);

    let result = store
        .get_or_compute(&key("x"), TTL, || async { Err::<u32, _>("boom") })
        .await;

    assert_eq!(result, Err("boom"));
    assert!(store.is_empty());

    let (value, hit) = store
        .get_or_compute(&key("x"), TTL, || async { Ok::<_, &str>(5) })
        .await
        .unwrap();
    assert_eq!((value, hit), (5, false), "no negative caching");
}

#[test]
fn test_zero_capacity_degrades_to_miss() {
    let store = CacheStore::with_config(0, TTL);
    assert!(!store.insert(key("a"), 1u32, TTL));
    assert_eq!(store.get(&key("a")), None);

    let stats = store.stats();
    assert_eq!(stats.faults, 1);
    assert_eq!(stats.current_size, 0);
}

#[tokio::test]
async fn test_expiry_overflow_is_absorbed() {
    let store = CacheStore::with_config(10, TTL);

    let (value, hit) = store
        .get_or_compute(&key("a"), Duration::MAX, || async { Ok::<_, String>(3u32) })
        .await
        .unwrap();

    assert_eq!((value, hit), (3, false));
    assert!(store.is_empty());
    assert_eq!(store.stats().faults, 1);
}

#[test]
fn test_remove_and_clear() {
    let store = CacheStore::with_config(10, TTL);
    store.insert(key("a"), 1u32, TTL);
    store.insert(key("b"), 2, TTL);

    assert_eq!(store.remove(&key("a")), Some(1));
    assert_eq!(store.remove(&key("a")), None);
    assert_eq!(store.len(), 1);

    store.clear();
    assert!(store.is_empty());

    // A cleared store refills to capacity without evicting.
    let small = CacheStore::with_config(1, TTL);
    small.insert(key("a"), 1u32, TTL);
    small.clear();
    small.insert(key("b"), 2, TTL);
    assert_eq!(small.stats().evictions, 0);
}

#[test]
fn test_stats_hit_rate() {
    let store = CacheStore::with_config(10, TTL);
    assert_eq!(store.stats().hit_rate(), 0.0);

    store.insert(key("a"), 1u32, TTL);
    store.get(&key("a"));
    store.get(&key("a"));
    store.get(&key("a"));
    store.get(&key("b"));

    assert!((store.stats().hit_rate() - 0.75).abs() < f64::EPSILON);
}

#[test]
fn test_handle_shares_store() {
    let handle: CacheStoreHandle<u32> = CacheStoreHandle::with_config(5, TTL);
    let clone = handle.clone();
    assert_eq!(handle.strong_count(), 2);

    clone.insert(key("shared"), 9, TTL);
    assert_eq!(handle.get(&key("shared")), Some(9));
    assert_eq!(handle.stats().hits, 1);
}

#[tokio::test]
async fn test_concurrent_access_keeps_capacity() {
    let handle: CacheStoreHandle<usize> = CacheStoreHandle::with_config(16, TTL);
    let tasks: Vec<_> = (0..8)
        .map(|worker| {
            let handle = handle.clone();
            tokio::spawn(async move {
                for i in 0..50 {
                    let k = key(&format!("w{worker}-{}", i % 20));
                    let _ = handle
                        .get_or_compute(&k, TTL, || async move { Ok::<_, ()>(i) })
                        .await;
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    let stats = handle.stats();
    assert!(stats.current_size <= 16);
    assert_eq!(stats.hits + stats.misses, 400);
}

#[test]
fn test_store_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CacheStore<Arc<[f32]>>>();
    assert_send_sync::<CacheStoreHandle<Arc<[f32]>>>();
}
