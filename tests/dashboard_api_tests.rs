//! Dashboard API integration tests
//!
//! Authentication, owner scoping, tracker CRUD and the analytics read endpoints.

use std::sync::{Arc, Once};

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::Utc;
use serde_json::{Value, json};
use tempfile::TempDir;

use scrolldepth::analytics::HashCountryLookup;
use scrolldepth::api::middleware::{OriginPolicy, OwnerAuth, TrackingCors};
use scrolldepth::api::services::{trackers_routes, tracking_routes};
use scrolldepth::config::{get_config, init_config};
use scrolldepth::services::{DashboardService, IngestService, TrackerService};
use scrolldepth::storage::SeaOrmStorage;

static INIT: Once = Once::new();

const API_KEY: &str = "dashboard_test_key_0123456789abcdef";

fn init_static_config() {
    INIT.call_once(|| {
        unsafe {
            std::env::set_var("SD__AUTH__PUBLIC_KEY", API_KEY);
        }
        init_config();
    });
}

async fn setup() -> (TempDir, Arc<SeaOrmStorage>) {
    init_static_config();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("dashboard_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    (temp_dir, storage)
}

macro_rules! dashboard_app {
    ($storage:expr) => {{
        let config = get_config();
        test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::new(IngestService::new($storage.clone()))))
                .app_data(web::Data::new(Arc::new(TrackerService::new($storage.clone()))))
                .app_data(web::Data::new(Arc::new(DashboardService::new(
                    $storage.clone(),
                    Arc::new(HashCountryLookup),
                    &config.dashboard,
                ))))
                .service(
                    web::scope("/api")
                        .wrap(OwnerAuth)
                        .service(trackers_routes()),
                )
                .configure(|cfg| {
                    tracking_routes(cfg, TrackingCors::new(OriginPolicy::default()), None)
                }),
        )
        .await
    }};
}

fn authed(req: TestRequest, owner: &str) -> TestRequest {
    req.insert_header(("Authorization", format!("Bearer {}", API_KEY)))
        .insert_header(("X-Owner-Id", owner))
}

macro_rules! create_tracker {
    ($app:expr, $owner:expr) => {{
        let req = authed(TestRequest::post().uri("/api/trackers"), $owner).to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json: Value = test::read_body_json(resp).await;
        json["data"]["id"].as_str().unwrap().to_string()
    }};
}

macro_rules! send_event {
    ($app:expr, $body:expr, $ip:expr) => {{
        let req = TestRequest::post()
            .uri("/track")
            .insert_header(("X-Forwarded-For", $ip))
            .set_json($body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }};
}

fn event_body(tracker_id: &str, depth: i32) -> Value {
    json!({
        "trackerId": tracker_id,
        "scrollDepth": depth,
        "pageUrl": "https://blog.example.com/post",
        "timestamp": Utc::now().timestamp_millis()
    })
}

#[actix_rt::test]
async fn test_missing_bearer_is_401() {
    let (_dir, storage) = setup().await;
    let app = dashboard_app!(storage);

    let req = TestRequest::get()
        .uri("/api/trackers")
        .insert_header(("X-Owner-Id", "alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = TestRequest::get()
        .uri("/api/trackers")
        .insert_header(("Authorization", "Bearer wrong"))
        .insert_header(("X-Owner-Id", "alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["code"], 1001);
}

#[actix_rt::test]
async fn test_missing_owner_is_400() {
    let (_dir, storage) = setup().await;
    let app = dashboard_app!(storage);

    let req = TestRequest::get()
        .uri("/api/trackers")
        .insert_header(("Authorization", format!("Bearer {}", API_KEY)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["code"], 1002);
}

#[actix_rt::test]
async fn test_tracker_crud_is_owner_scoped() {
    let (_dir, storage) = setup().await;
    let app = dashboard_app!(storage);

    let id = create_tracker!(app, "alice");
    assert_eq!(id.len(), 16);

    // 自己可见
    let req = authed(TestRequest::get().uri("/api/trackers"), "alice").to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["code"], 0);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["id"], id.as_str());
    assert_eq!(
        json["data"][0]["scriptPath"],
        format!("/tracker-script?id={}", id)
    );

    // 别人看不到，且与不存在无法区分
    let req = authed(TestRequest::get().uri("/api/trackers"), "mallory").to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let req = authed(
        TestRequest::get().uri(&format!("/api/trackers/{}", id)),
        "mallory",
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["code"], 3000);

    let req = authed(
        TestRequest::delete().uri(&format!("/api/trackers/{}", id)),
        "mallory",
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = authed(
        TestRequest::get().uri(&format!("/api/trackers/{}", id)),
        "alice",
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_delete_cascades_events() {
    let (_dir, storage) = setup().await;
    let app = dashboard_app!(storage);

    let id = create_tracker!(app, "alice");
    send_event!(app, event_body(&id, 40), "203.0.113.9");
    send_event!(app, event_body(&id, 80), "203.0.113.9");
    assert_eq!(storage.count_events(&id).await.unwrap(), 2);

    let req = authed(
        TestRequest::delete().uri(&format!("/api/trackers/{}", id)),
        "alice",
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(storage.count_events(&id).await.unwrap(), 0);
    assert!(storage.find_tracker(&id).await.unwrap().is_none());

    // 删除后的上报按未知追踪器处理
    let req = TestRequest::post()
        .uri("/track")
        .set_json(event_body(&id, 10))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_events_newest_first_with_limit() {
    let (_dir, storage) = setup().await;
    let app = dashboard_app!(storage);

    let id = create_tracker!(app, "alice");
    let base = Utc::now().timestamp_millis() - 10_000;
    for (offset, depth) in [(0, 10), (1000, 20), (2000, 30)] {
        let body = json!({
            "trackerId": id,
            "scrollDepth": depth,
            "pageUrl": "https://blog.example.com/post",
            "timestamp": base + offset
        });
        send_event!(app, body, "203.0.113.9");
    }

    let req = authed(
        TestRequest::get().uri(&format!("/api/trackers/{}/events?limit=2", id)),
        "alice",
    )
    .to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    let events = json["data"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["scrollDepth"], 30);
    assert_eq!(events[1]["scrollDepth"], 20);
}

#[actix_rt::test]
async fn test_summary_and_visitors() {
    let (_dir, storage) = setup().await;
    let app = dashboard_app!(storage);

    let id = create_tracker!(app, "alice");
    send_event!(app, event_body(&id, 20), "198.51.100.1");
    send_event!(app, event_body(&id, 60), "198.51.100.2");
    send_event!(app, event_body(&id, 100), "198.51.100.2");

    let req = authed(
        TestRequest::get().uri(&format!("/api/trackers/{}/summary", id)),
        "alice",
    )
    .to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    let data = &json["data"];
    assert_eq!(data["totalEvents"], 3);
    assert_eq!(data["milestones"]["p25"], 66);
    assert_eq!(data["milestones"]["p50"], 66);
    assert_eq!(data["milestones"]["p75"], 33);
    assert_eq!(data["milestones"]["p100"], 33);
    assert_eq!(data["visitors"].as_array().unwrap().len(), 2);

    let req = authed(
        TestRequest::get().uri(&format!("/api/trackers/{}/visitors", id)),
        "alice",
    )
    .to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    let visitors = json["data"].as_array().unwrap();
    assert_eq!(visitors.len(), 2);
    let second = visitors
        .iter()
        .find(|v| v["ip"] == "198.51.100.2")
        .unwrap();
    assert_eq!(second["events"], 2);

    // 其他所有者读取统计同样得到 404
    let req = authed(
        TestRequest::get().uri(&format!("/api/trackers/{}/summary", id)),
        "mallory",
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_summary_of_empty_tracker() {
    let (_dir, storage) = setup().await;
    let app = dashboard_app!(storage);

    let id = create_tracker!(app, "alice");
    let req = authed(
        TestRequest::get().uri(&format!("/api/trackers/{}/summary", id)),
        "alice",
    )
    .to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["data"]["totalEvents"], 0);
    assert_eq!(json["data"]["milestones"]["p25"], 0);
    assert!(json["data"]["visitors"].as_array().unwrap().is_empty());
}
