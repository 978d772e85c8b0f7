use sarsync::{InMemory, MutationOp, OfflineStore, OfflineStoreExt};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Attendance {
    class: String,
    present: Vec<String>,
}

#[tokio::test]
async fn reopened_store_keeps_entries_and_queue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("offline.json");

    {
        let store = InMemory::open(&path).await.unwrap();
        store.save("draft-1", json!({"a": 1})).await.unwrap();
        store.save("draft-2", json!({"b": 2})).await.unwrap();
        store.delete("draft-2").await.unwrap();
    }

    let store = InMemory::open(&path).await.unwrap();
    assert_eq!(store.get("draft-1").await.unwrap(), Some(json!({"a": 1})));
    assert_eq!(store.get("draft-2").await.unwrap(), None);

    let queue = store.get_sync_queue().await.unwrap();
    let ops: Vec<_> = queue.iter().map(|m| (m.key.as_str(), m.is_delete())).collect();
    assert_eq!(
        ops,
        vec![("draft-1", false), ("draft-2", false), ("draft-2", true)]
    );
}

#[tokio::test]
async fn typed_values_round_trip_through_queue() {
    let store = InMemory::new();
    let roll = Attendance {
        class: "JHS 2".into(),
        present: vec!["Ama".into(), "Yaw".into()],
    };
    store.save_as("attendance/2024-01-08", &roll).await.unwrap();

    let loaded: Option<Attendance> = store.get_as("attendance/2024-01-08").await.unwrap();
    assert_eq!(loaded, Some(roll.clone()));

    let queue = store.get_sync_queue().await.unwrap();
    assert_eq!(
        queue[0].op,
        MutationOp::Upsert {
            value: serde_json::to_value(&roll).unwrap()
        }
    );
    assert_eq!(store.pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn acknowledge_removes_only_named_mutations() {
    let store = InMemory::new();
    store.save("a", json!(1)).await.unwrap();
    store.save("b", json!(2)).await.unwrap();
    let queue = store.get_sync_queue().await.unwrap();

    assert_eq!(store.acknowledge(&[queue[0].id]).await.unwrap(), 1);
    assert_eq!(store.acknowledge(&[queue[0].id]).await.unwrap(), 0);

    let rest = store.get_sync_queue().await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].key, "b");
    assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);
}
