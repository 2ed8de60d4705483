//! 仪表盘 API 类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::constants::SCRIPT_PATH;
use crate::storage::Tracker;

/// 统一响应信封 `{code, message, data}`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackerResponse {
    pub id: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    /// 嵌入用的脚本路径（相对服务根）
    pub script_path: String,
}

impl From<Tracker> for TrackerResponse {
    fn from(tracker: Tracker) -> Self {
        let script_path = format!("{}?id={}", SCRIPT_PATH, tracker.id);
        Self {
            id: tracker.id,
            owner: tracker.owner,
            created_at: tracker.created_at,
            script_path,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct EventsQuery {
    pub limit: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MessageResponse {
    pub message: String,
}

// 健康检查
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthChecks {
    pub storage: HealthStorageCheck,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u64,
    pub checks: HealthChecks,
    pub response_time_ms: u64,
}
