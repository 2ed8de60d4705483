use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 追踪器：一个被监控的页面/站点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracker {
    pub id: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

/// 已存储的滚动事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollEvent {
    pub id: i64,
    pub tracker_id: String,
    pub scroll_depth: i32,
    pub page_url: String,
    pub occurred_at: DateTime<Utc>,
    pub time_on_page: Option<i64>,
    pub total_time_on_page: Option<i64>,
    pub max_scroll_depth: Option<i32>,
    pub scroll_events: Option<i32>,
    pub engagement: Option<serde_json::Value>,
    pub ua: Option<String>,
    pub viewport_w: Option<i32>,
    pub viewport_h: Option<i32>,
    pub ip_address: Option<String>,
}

/// 待插入的滚动事件（已通过校验）
#[derive(Debug, Clone, PartialEq)]
pub struct NewScrollEvent {
    pub tracker_id: String,
    pub scroll_depth: i32,
    pub page_url: String,
    pub occurred_at: DateTime<Utc>,
    pub time_on_page: Option<i64>,
    pub total_time_on_page: Option<i64>,
    pub max_scroll_depth: Option<i32>,
    pub scroll_events: Option<i32>,
    pub engagement: Option<serde_json::Value>,
    pub ua: Option<String>,
    pub viewport_w: Option<i32>,
    pub viewport_h: Option<i32>,
    pub ip_address: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
}
