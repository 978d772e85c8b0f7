use std::time::Duration;

use sarsync::{Config, OfflineStore, OfflineStoreExt, SyncConfig, SyncReport};
use serde_json::json;

use crate::helpers::{eventually, test_services, test_services_with};

#[tokio::test]
async fn offline_sync_leaves_queue_untouched() {
    let ctx = test_services(false);
    ctx.store.save("draft-1", json!({"a": 1})).await.unwrap();

    let err = ctx.services.sync().sync().await.unwrap_err();
    assert!(err.is_offline());
    assert_eq!(ctx.remote.push_count(), 0);
    assert_eq!(ctx.store.pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn failed_push_keeps_queue_for_next_pass() {
    let ctx = test_services(true);
    ctx.store.save("draft-1", json!({"a": 1})).await.unwrap();
    ctx.store.save("draft-2", json!({"b": 2})).await.unwrap();

    ctx.remote.set_failing(true);
    let err = ctx.services.sync().sync().await.unwrap_err();
    assert!(err.is_network_error());
    assert_eq!(ctx.store.pending_count().await.unwrap(), 2);

    ctx.remote.set_failing(false);
    let report = ctx.services.sync().sync().await.unwrap();
    assert_eq!(
        report,
        SyncReport {
            pushed: 2,
            remaining: 0
        }
    );
    assert_eq!(ctx.remote.received_keys(), vec!["draft-1", "draft-2"]);
}

#[tokio::test]
async fn overlapping_syncs_push_each_mutation_once() {
    let ctx = test_services(true);
    for i in 0..10 {
        ctx.store.save(&format!("k{i}"), json!(i)).await.unwrap();
    }

    let sync = ctx.services.sync().clone();
    let (a, b) = tokio::join!(sync.sync(), sync.sync());
    assert_eq!(a.unwrap().pushed + b.unwrap().pushed, 10);
    assert_eq!(ctx.remote.received_keys().len(), 10);
}

#[tokio::test]
async fn background_sync_drains_on_reconnect() {
    let ctx = test_services(false);
    ctx.store.save("draft-1", json!({"a": 1})).await.unwrap();

    let handle = ctx.services.start_background_sync();
    assert!(handle.is_running());
    ctx.services.sync().set_online(true);

    let store = ctx.store.clone();
    assert!(eventually(|| async { store.pending_count().await.unwrap() == 0 }).await);
    assert_eq!(ctx.remote.push_count(), 1);
    handle.shutdown().await;
}

#[tokio::test]
async fn background_sync_retries_periodically() {
    let ctx = test_services_with(Config::default().with_sync(
        SyncConfig::default().with_periodic_interval(Duration::from_millis(20)),
    ));
    ctx.remote.set_failing(true);
    ctx.store.save("draft-1", json!({"a": 1})).await.unwrap();

    let handle = ctx.services.start_background_sync();
    let remote = ctx.remote.clone();
    assert!(eventually(|| async { remote.push_count() >= 1 }).await);

    ctx.remote.set_failing(false);
    let store = ctx.store.clone();
    assert!(eventually(|| async { store.pending_count().await.unwrap() == 0 }).await);
    handle.shutdown().await;
}

#[tokio::test]
async fn sync_now_goes_through_the_engine() {
    let ctx = test_services(true);
    ctx.store.save("draft-1", json!({"a": 1})).await.unwrap();
    ctx.store.delete("draft-1").await.unwrap();

    let handle = ctx.services.start_background_sync();
    let report = handle.sync_now().await.unwrap();
    assert_eq!(report.pushed, 2);
    assert!(ctx.store.get_sync_queue().await.unwrap().is_empty());
    handle.shutdown().await;
}
