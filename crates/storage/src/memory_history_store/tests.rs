// Path: crates/storage/src/memory_history_store/tests.rs

use super::*;
use hkv_api::kv::Kv;
use hkv_api::pending::PendingOperations;
use hkv_api::seq::Concat;
use hkv_types::error::ErrorCode;
use std::time::Duration;

fn store_with(config: HistoryConfig) -> (MemHistoryStore, Arc<PendingOperations>) {
    let pending = Arc::new(PendingOperations::new());
    let store = MemHistoryStore::new(config, pending.clone()).unwrap();
    (store, pending)
}

fn store() -> (MemHistoryStore, Arc<PendingOperations>) {
    store_with(HistoryConfig::default())
}

fn put(store: &MemHistoryStore, key: &str, value: &str, token: &Token) {
    store
        .write_batch(&[(key.as_bytes().to_vec(), Some(value.as_bytes().to_vec()))], token)
        .unwrap();
}

fn get(store: &MemHistoryStore, key: &str, token: &Token) -> Option<String> {
    store
        .read_at(key.as_bytes(), token)
        .unwrap()
        .map(|v| String::from_utf8(v.to_vec()).unwrap())
}

#[test]
fn test_floor_reads_between_siblings() {
    let (store, _pending) = store();
    let t1 = Token::ZERO;
    let t2 = t1.advance_sibling().unwrap();
    put(&store, "x", "A", &t1);
    put(&store, "x", "B", &t2);

    assert_eq!(get(&store, "x", &t1).as_deref(), Some("A"));
    assert_eq!(get(&store, "x", &t2).as_deref(), Some("B"));
    // 0.0 sorts after 0 and before 1.
    assert_eq!(get(&store, "x", &t1.descend().unwrap()).as_deref(), Some("A"));
    assert_eq!(get(&store, "x", &Token::new(50)).as_deref(), Some("B"));
}

#[test]
fn test_expired_read_is_distinct_from_never_written() {
    let config = HistoryConfig {
        max_size: 1,
        ..HistoryConfig::default()
    };
    let (store, _pending) = store_with(config);
    let t1 = Token::new(1);
    let t2 = Token::new(2);
    put(&store, "k", "v1", &t1);
    // The second write evicts the first buffer entry, which trims version 1.
    put(&store, "k", "v2", &t2);
    assert_eq!(store.version_count(b"k"), 1);

    let err = store.read_at(b"k", &t1).unwrap_err();
    match err {
        HistoryError::ExpiredRead {
            key,
            requested,
            oldest,
        } => {
            assert_eq!(key, b"k".to_vec());
            assert_eq!(requested, t1);
            assert_eq!(oldest, t2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.read_at(b"never", &t1).unwrap(), None);
    assert_eq!(store.read_at(b"k", &Token::ZERO).unwrap_err().code(), "HISTORY_EXPIRED_READ");
}

#[test]
fn test_tombstone_collected_when_nothing_pending() {
    let (store, pending) = store();
    let t3 = Token::new(3);
    put(&store, "y", "alive", &Token::new(1));
    store.delete_at(b"y", &t3).unwrap();
    assert!(pending.is_empty());

    let stats = store.collect_now();
    assert_eq!(stats.keys_collected, 1);
    assert!(!stats.skipped);
    assert!(store.is_empty());
    assert_eq!(store.read_at(b"y", &t3).unwrap(), None);
}

#[test]
fn test_max_size_one_keeps_single_buffer_entry() {
    let config = HistoryConfig {
        max_size: 1,
        ..HistoryConfig::default()
    };
    let (store, _pending) = store_with(config);
    put(&store, "a", "1", &Token::new(1));
    assert_eq!(store.buffer_len(), 1);
    put(&store, "b", "2", &Token::new(2));
    assert_eq!(store.buffer_len(), 1);

    let batch = vec![
        (b"c".to_vec(), Some(b"3".to_vec())),
        (b"d".to_vec(), Some(b"4".to_vec())),
    ];
    store.write_batch(&batch, &Token::new(3)).unwrap();
    assert_eq!(store.buffer_len(), 1);
    // Trimming single-version keys leaves their values readable.
    assert_eq!(get(&store, "a", &Token::new(9)).as_deref(), Some("1"));
    assert_eq!(store.len(), 4);
}

#[test]
fn test_purge_controls_live_value_collection() {
    let (keep, _p1) = store();
    put(&keep, "k", "v", &Token::new(1));
    assert_eq!(keep.collect_now().keys_collected, 0);
    assert_eq!(keep.len(), 1);

    let (purge, _p2) = store_with(HistoryConfig {
        purge: true,
        ..HistoryConfig::default()
    });
    put(&purge, "k", "v", &Token::new(1));
    assert_eq!(purge.collect_now().keys_collected, 1);
    assert!(purge.is_empty());
}

#[test]
fn test_pending_operation_blocks_collection() {
    let (store, pending) = store();
    let guard = pending.guard(Token::new(3));
    store.delete_at(b"y", &Token::new(3)).unwrap();
    store.delete_at(b"z", &Token::new(2)).unwrap();

    // "y" is visible to the operation at 3; "z" is strictly older.
    let stats = store.collect_now();
    assert_eq!(stats.keys_scanned, 2);
    assert_eq!(stats.keys_collected, 1);
    assert_eq!(store.version_count(b"y"), 1);
    assert_eq!(store.version_count(b"z"), 0);

    drop(guard);
    assert_eq!(store.collect_now().keys_collected, 1);
    assert!(store.is_empty());
}

#[test]
fn test_idle_collection_can_be_disabled() {
    let (store, pending) = store_with(HistoryConfig {
        collect_when_idle: false,
        ..HistoryConfig::default()
    });
    store.delete_at(b"y", &Token::new(1)).unwrap();
    let stats = store.collect_now();
    assert!(stats.skipped);
    assert_eq!(store.len(), 1);

    let _guard = pending.guard(Token::new(10));
    assert_eq!(store.collect_now().keys_collected, 1);
}

#[test]
fn test_trimming_continues_with_idle_collection_disabled() {
    let (store, _pending) = store_with(HistoryConfig {
        max_size: 1,
        min_age_ms: 0,
        collect_when_idle: false,
        ..HistoryConfig::default()
    });
    for root in 1..=50 {
        put(&store, "k", &format!("v{root}"), &Token::new(root));
        assert!(store.version_count(b"k") <= 2, "versions grew to {}", store.version_count(b"k"));
    }
    assert_eq!(get(&store, "k", &Token::new(50)).as_deref(), Some("v50"));
    assert_eq!(store.buffer_len(), 1);

    // Whole-key removal still waits for a horizon.
    store.delete_at(b"k", &Token::new(51)).unwrap();
    put(&store, "other", "x", &Token::new(52));
    assert_eq!(store.version_count(b"k"), 1);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_write_after_retirement_lands_in_fresh_list() {
    let (store, _pending) = store();
    put(&store, "k", "v1", &Token::new(1));
    let retired = store.core.list(b"k").unwrap();
    retired.write().retired = true;

    put(&store, "k", "v2", &Token::new(2));
    let fresh = store.core.list(b"k").unwrap();
    assert!(!Arc::ptr_eq(&retired, &fresh));
    assert_eq!(retired.read().len(), 1);
    assert_eq!(store.version_count(b"k"), 1);
    assert_eq!(get(&store, "k", &Token::new(2)).as_deref(), Some("v2"));
    assert!(matches!(
        store.read_at(b"k", &Token::new(1)),
        Err(HistoryError::ExpiredRead { .. })
    ));
}

#[test]
fn test_trimming_keeps_versions_pending_readers_need() {
    let (store, pending) = store_with(HistoryConfig {
        max_size: 1,
        ..HistoryConfig::default()
    });
    let reader = pending.guard(Token::new(1));
    put(&store, "k", "v1", &Token::new(1));
    put(&store, "k", "v2", &Token::new(2));
    // Version 2 is newer than the pending reader, so version 1 stays.
    assert_eq!(store.version_count(b"k"), 2);
    assert_eq!(get(&store, "k", reader.token()).as_deref(), Some("v1"));
    assert_eq!(
        store.retained_range(b"k"),
        Some((Token::new(1), Token::new(2)))
    );

    drop(reader);
    put(&store, "k", "v3", &Token::new(3));
    assert_eq!(store.version_count(b"k"), 2);
    assert_eq!(store.retained_range(b"k").map(|(oldest, _)| oldest), Some(Token::new(2)));
}

#[test]
fn test_aged_entries_drive_trimming() {
    let (store, _pending) = store_with(HistoryConfig {
        min_age_ms: 0,
        ..HistoryConfig::default()
    });
    for root in 1..=5 {
        put(&store, "k", &format!("v{root}"), &Token::new(root));
    }
    assert_eq!(store.version_count(b"k"), 1);
    assert_eq!(get(&store, "k", &Token::new(5)).as_deref(), Some("v5"));
    assert!(store.buffer_len() <= 1);
}

#[test]
fn test_batch_records_each_key_once() {
    let (store, _pending) = store();
    let batch = vec![
        (b"a".to_vec(), Some(b"1".to_vec())),
        (b"a".to_vec(), Some(b"2".to_vec())),
        (b"b".to_vec(), None),
    ];
    store.write_batch(&batch, &Token::new(1)).unwrap();
    assert_eq!(store.buffer_len(), 2);
    assert_eq!(store.version_count(b"a"), 1);
    assert_eq!(get(&store, "a", &Token::new(1)).as_deref(), Some("2"));
    assert_eq!(get(&store, "b", &Token::new(1)), None);
}

#[test]
fn test_drilled_views_share_data() {
    let (store, _pending) = store();
    let users = store.drill(b"users/");
    let alice = users.drill(b"alice/");
    assert_eq!(alice.prefix(), b"users/alice/");

    alice.write_at(b"age", b"30", &Token::new(1)).unwrap();
    assert_eq!(
        store.read_at(b"users/alice/age", &Token::new(1)).unwrap().as_deref(),
        Some(&b"30"[..])
    );

    let key = Concat::new(b"alice/", b"age");
    assert_eq!(
        users.read_seq_at(&key, &Token::new(2)).unwrap().as_deref(),
        Some(&b"30"[..])
    );

    let view = users.at(Token::new(2));
    view.delete(b"alice/age").unwrap();
    assert_eq!(alice.read_at(b"age", &Token::new(2)).unwrap(), None);
    assert_eq!(
        alice.read_at(b"age", &Token::new(1)).unwrap().as_deref(),
        Some(&b"30"[..])
    );
}

#[test]
fn test_shutdown_is_idempotent_and_store_stays_usable() {
    let (store, _pending) = store();
    assert!(store.is_collector_running());
    store.shutdown();
    assert!(!store.is_collector_running());
    store.shutdown();
    store.drill(b"ns/").shutdown();

    put(&store, "k", "v", &Token::new(1));
    assert_eq!(get(&store, "k", &Token::new(1)).as_deref(), Some("v"));
    store.delete_at(b"k", &Token::new(2)).unwrap();
    assert_eq!(store.collect_now().keys_collected, 1);
}

#[test]
fn test_background_collector_sweeps_periodically() {
    let (store, _pending) = store_with(HistoryConfig {
        gc_interval_ms: 10,
        ..HistoryConfig::default()
    });
    store.delete_at(b"gone", &Token::new(1)).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !store.is_empty() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(store.is_empty());
}

#[test]
fn test_views_outlive_the_store() {
    let (store, _pending) = store();
    let view = store.drill(b"ns/");
    drop(store);
    view.write_at(b"k", b"v", &Token::new(1)).unwrap();
    assert_eq!(view.read_at(b"k", &Token::new(1)).unwrap().as_deref(), Some(&b"v"[..]));
}

#[test]
fn test_invalid_config_is_rejected() {
    let pending: Arc<dyn PendingRegistry> = Arc::new(|| None::<Token>);
    let err = MemHistoryStore::new(
        HistoryConfig {
            max_size: 0,
            ..HistoryConfig::default()
        },
        pending,
    )
    .unwrap_err();
    assert!(matches!(err, HistoryError::InvalidConfig(_)));
}

#[test]
fn test_closure_registry_sets_horizon() {
    let pending: Arc<dyn PendingRegistry> = Arc::new(|| Some(Token::new(2)));
    let store = MemHistoryStore::new(HistoryConfig::default(), pending).unwrap();
    store.delete_at(b"old", &Token::new(1)).unwrap();
    store.delete_at(b"new", &Token::new(2)).unwrap();
    assert_eq!(store.collect_now().keys_collected, 1);
    assert_eq!(store.version_count(b"new"), 1);
}
