//! SeaORM storage tests against a temporary SQLite file

use std::sync::Once;

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use scrolldepth::config::init_config;
use scrolldepth::errors::ScrolldepthError;
use scrolldepth::storage::{NewScrollEvent, SeaOrmStorage, Tracker};

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

async fn create_storage() -> (TempDir, SeaOrmStorage) {
    init_static_config();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("storage_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");
    (temp_dir, storage)
}

fn tracker(id: &str, owner: &str) -> Tracker {
    Tracker {
        id: id.to_string(),
        owner: owner.to_string(),
        created_at: Utc::now(),
    }
}

fn new_event(tracker_id: &str, depth: i32, ms: i64) -> NewScrollEvent {
    NewScrollEvent {
        tracker_id: tracker_id.to_string(),
        scroll_depth: depth,
        page_url: "https://example.com/".to_string(),
        occurred_at: Utc.timestamp_millis_opt(ms).unwrap(),
        time_on_page: Some(1500),
        total_time_on_page: None,
        max_scroll_depth: None,
        scroll_events: None,
        engagement: Some(serde_json::json!({"clicks": 2})),
        ua: Some("Mozilla/5.0".to_string()),
        viewport_w: Some(1280),
        viewport_h: Some(800),
        ip_address: Some("192.0.2.1".to_string()),
    }
}

#[tokio::test]
async fn test_insert_tracker_if_absent() {
    let (_dir, storage) = create_storage().await;

    assert!(storage.insert_tracker_if_absent(&tracker("t1", "alice")).await.unwrap());
    // 同 id 再次插入不覆盖
    assert!(!storage.insert_tracker_if_absent(&tracker("t1", "bob")).await.unwrap());

    let found = storage.find_tracker("t1").await.unwrap().unwrap();
    assert_eq!(found.owner, "alice");
}

#[tokio::test]
async fn test_owner_scoped_queries() {
    let (_dir, storage) = create_storage().await;

    storage.insert_tracker_if_absent(&tracker("t1", "alice")).await.unwrap();
    storage.insert_tracker_if_absent(&tracker("t2", "alice")).await.unwrap();
    storage.insert_tracker_if_absent(&tracker("t3", "bob")).await.unwrap();

    assert_eq!(storage.list_trackers("alice").await.unwrap().len(), 2);
    assert_eq!(storage.list_trackers("bob").await.unwrap().len(), 1);
    assert!(storage.list_trackers("carol").await.unwrap().is_empty());

    assert!(storage.find_owned_tracker("alice", "t1").await.unwrap().is_some());
    assert!(storage.find_owned_tracker("bob", "t1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_event_round_trip_and_order() {
    let (_dir, storage) = create_storage().await;
    storage.insert_tracker_if_absent(&tracker("t1", "alice")).await.unwrap();

    let base = 1_700_000_000_000i64;
    storage.insert_event(&new_event("t1", 25, base)).await.unwrap();
    storage.insert_event(&new_event("t1", 75, base + 2000)).await.unwrap();
    storage.insert_event(&new_event("t1", 50, base + 1000)).await.unwrap();

    let events = storage.recent_events("t1", 10).await.unwrap();
    let depths: Vec<i32> = events.iter().map(|e| e.scroll_depth).collect();
    assert_eq!(depths, vec![75, 50, 25]);

    let first = &events[0];
    assert_eq!(first.time_on_page, Some(1500));
    assert_eq!(first.viewport_w, Some(1280));
    assert_eq!(first.engagement, Some(serde_json::json!({"clicks": 2})));
    assert_eq!(first.ip_address.as_deref(), Some("192.0.2.1"));

    assert_eq!(storage.recent_events("t1", 2).await.unwrap().len(), 2);
    assert_eq!(storage.count_events("t1").await.unwrap(), 3);
}

#[tokio::test]
async fn test_events_since_filters_by_time() {
    let (_dir, storage) = create_storage().await;
    storage.insert_tracker_if_absent(&tracker("t1", "alice")).await.unwrap();

    let now = Utc::now();
    let old = (now - Duration::hours(2)).timestamp_millis();
    let fresh = (now - Duration::minutes(5)).timestamp_millis();
    storage.insert_event(&new_event("t1", 10, old)).await.unwrap();
    storage.insert_event(&new_event("t1", 90, fresh)).await.unwrap();

    let recent = storage
        .events_since("t1", Some(now - Duration::minutes(30)), 100)
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].scroll_depth, 90);
}

#[tokio::test]
async fn test_delete_tracker_cascades() {
    let (_dir, storage) = create_storage().await;
    storage.insert_tracker_if_absent(&tracker("t1", "alice")).await.unwrap();
    storage.insert_tracker_if_absent(&tracker("t2", "alice")).await.unwrap();
    storage.insert_event(&new_event("t1", 10, 1_700_000_000_000)).await.unwrap();
    storage.insert_event(&new_event("t2", 20, 1_700_000_000_000)).await.unwrap();

    // 非所有者删除失败
    let err = storage.delete_tracker("bob", "t1").await.unwrap_err();
    assert!(matches!(err, ScrolldepthError::NotFound(_)));
    assert_eq!(storage.count_events("t1").await.unwrap(), 1);

    storage.delete_tracker("alice", "t1").await.unwrap();
    assert!(storage.find_tracker("t1").await.unwrap().is_none());
    assert_eq!(storage.count_events("t1").await.unwrap(), 0);
    assert_eq!(storage.count_events("t2").await.unwrap(), 1);
}

#[tokio::test]
async fn test_event_for_missing_tracker_is_rejected() {
    let (_dir, storage) = create_storage().await;
    assert!(
        storage
            .insert_event(&new_event("ghost", 10, 1_700_000_000_000))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_ping_and_backend() {
    let (_dir, storage) = create_storage().await;
    storage.ping().await.unwrap();
    assert_eq!(storage.get_backend_config().storage_type, "sqlite");
}
