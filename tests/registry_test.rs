//! Integration tests for the connection registry

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use pushcore::registry::ConnectionRegistry;
use pushcore::transport::ConnectionHandle;

fn test_handle() -> (ConnectionHandle, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ConnectionHandle::new(tx), rx)
}

#[tokio::test]
async fn register_returns_fresh_id_with_liveness_set() {
    let registry = ConnectionRegistry::new();
    let (handle, _rx) = test_handle();

    let before = Instant::now();
    let id = registry.register(handle).await;
    let after = Instant::now();

    let record = registry.lookup(id).await.expect("record must exist");
    assert_eq!(record.id, id);
    assert!(record.last_seen >= before);
    assert!(record.last_seen <= after);
}

#[tokio::test]
async fn ids_are_never_reused() {
    let registry = ConnectionRegistry::new();

    let (first, _rx1) = test_handle();
    let first_id = registry.register(first).await;

    let (second, _rx2) = test_handle();
    let second_id = registry.register(second).await;
    assert_ne!(first_id, second_id);

    // removal does not recycle identifiers
    assert!(registry.remove(first_id).await);
    let (third, _rx3) = test_handle();
    let third_id = registry.register(third).await;
    assert_ne!(third_id, first_id);
    assert_ne!(third_id, second_id);
}

#[tokio::test]
async fn remove_deletes_exactly_once() {
    let registry = ConnectionRegistry::new();
    let (handle, _rx) = test_handle();
    let id = registry.register(handle).await;

    assert!(registry.remove(id).await);
    assert!(registry.lookup(id).await.is_none());

    // second removal in immediate succession: safe no-op
    assert!(!registry.remove(id).await);
    assert_eq!(registry.len().await, 0);
}

#[tokio::test]
async fn remove_unknown_id_is_a_no_op() {
    let registry = ConnectionRegistry::new();
    let (handle, _rx) = test_handle();
    let live = registry.register(handle).await;

    let (other, _rx2) = test_handle();
    let unknown = {
        let scratch = ConnectionRegistry::new();
        scratch.register(other).await
    };

    assert!(!registry.remove(unknown).await);
    assert_eq!(registry.len().await, 1);
    assert!(registry.lookup(live).await.is_some());
}

#[tokio::test]
async fn heartbeat_only_moves_forward() {
    let registry = ConnectionRegistry::new();
    let (handle, _rx) = test_handle();
    let id = registry.register(handle).await;

    let initial = registry.lookup(id).await.unwrap().last_seen;

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(registry.update_heartbeat(id).await);

    let updated = registry.lookup(id).await.unwrap().last_seen;
    assert!(updated > initial);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(registry.update_heartbeat(id).await);
    assert!(registry.lookup(id).await.unwrap().last_seen >= updated);
}

#[tokio::test]
async fn heartbeat_for_unknown_id_changes_nothing() {
    let registry = ConnectionRegistry::new();
    let (handle, _rx) = test_handle();
    let id = registry.register(handle).await;
    let before = registry.lookup(id).await.unwrap().last_seen;

    let unknown = {
        let (other, _rx2) = test_handle();
        let scratch = ConnectionRegistry::new();
        scratch.register(other).await
    };

    assert!(!registry.update_heartbeat(unknown).await);
    assert_eq!(registry.len().await, 1);
    assert_eq!(registry.lookup(id).await.unwrap().last_seen, before);
}

#[tokio::test]
async fn lookup_does_not_touch_liveness() {
    let registry = ConnectionRegistry::new();
    let (handle, _rx) = test_handle();
    let id = registry.register(handle).await;

    let first = registry.lookup(id).await.unwrap().last_seen;
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = registry.lookup(id).await.unwrap().last_seen;

    assert_eq!(first, second);
}

#[tokio::test]
async fn concurrent_registrations_get_distinct_ids() {
    let registry = Arc::new(ConnectionRegistry::new());

    let (first, _rx1) = test_handle();
    let (second, _rx2) = test_handle();

    let a = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move { registry.register(first).await })
    };
    let b = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move { registry.register(second).await })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert_ne!(a, b);
    assert_eq!(registry.len().await, 2);

    let snapshot = registry.snapshot().await;
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.iter().any(|entry| entry.id == a));
    assert!(snapshot.iter().any(|entry| entry.id == b));

    assert!(registry.lookup(a).await.is_some());
    assert!(registry.lookup(b).await.is_some());
}

#[tokio::test]
async fn snapshot_is_detached_from_the_live_mapping() {
    let registry = ConnectionRegistry::new();
    let (handle, _rx) = test_handle();
    let id = registry.register(handle).await;

    let mut snapshot = registry.snapshot().await;
    snapshot.clear();
    assert_eq!(registry.len().await, 1);

    let snapshot = registry.snapshot().await;
    assert!(registry.remove(id).await);

    // the earlier copy still holds the entry; the registry does not
    assert_eq!(snapshot.len(), 1);
    assert!(registry.is_empty().await);
}
