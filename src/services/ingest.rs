//! 滚动事件上报
//!
//! 请求体先解析为 JSON，再逐字段校验并收集所有问题，
//! 而不是在第一个错误处停止。未知字段忽略。

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::errors::{Result, ScrolldepthError};
use crate::storage::{NewScrollEvent, SeaOrmStorage};
use crate::utils::url_validator::validate_url;

pub const TRACKER_ID_MIN_LEN: usize = 8;
pub const TRACKER_ID_MAX_LEN: usize = 64;
pub const MAX_VIEWPORT: i64 = 20_000;

/// 单个字段的校验问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

/// 校验失败（包含全部问题）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationFailure {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationFailure {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    fn single(path: &str, message: impl Into<String>) -> Self {
        let mut failure = Self::default();
        failure.push(path, message);
        failure
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .issues
            .iter()
            .map(|i| format!("{}: {}", i.path, i.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// 校验通过的事件（尚未关联客户端地址）
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEvent {
    pub tracker_id: String,
    pub scroll_depth: i32,
    pub page_url: String,
    pub occurred_at: DateTime<Utc>,
    pub time_on_page: Option<i64>,
    pub total_time_on_page: Option<i64>,
    pub max_scroll_depth: Option<i32>,
    pub scroll_events: Option<i32>,
    pub engagement: Option<Value>,
    pub ua: Option<String>,
    pub viewport_w: Option<i32>,
    pub viewport_h: Option<i32>,
}

impl ValidatedEvent {
    pub fn into_new_event(self, ip_address: String) -> NewScrollEvent {
        NewScrollEvent {
            tracker_id: self.tracker_id,
            scroll_depth: self.scroll_depth,
            page_url: self.page_url,
            occurred_at: self.occurred_at,
            time_on_page: self.time_on_page,
            total_time_on_page: self.total_time_on_page,
            max_scroll_depth: self.max_scroll_depth,
            scroll_events: self.scroll_events,
            engagement: self.engagement,
            ua: self.ua,
            viewport_w: self.viewport_w,
            viewport_h: self.viewport_h,
            ip_address: Some(ip_address),
        }
    }
}

/// 上报请求体
pub struct TrackPayload;

impl TrackPayload {
    /// 解析并校验原始请求体
    pub fn from_slice(body: &[u8]) -> std::result::Result<ValidatedEvent, ValidationFailure> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ValidationFailure::single("", format!("Malformed JSON: {}", e)))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> std::result::Result<ValidatedEvent, ValidationFailure> {
        let Some(obj) = value.as_object() else {
            return Err(ValidationFailure::single("", "Expected object"));
        };

        let mut failure = ValidationFailure::default();
        let mut fields = FieldReader {
            obj,
            prefix: "",
            failure: &mut failure,
        };

        let tracker_id = fields.required_string("trackerId").and_then(|id| {
            let len = id.chars().count();
            if (TRACKER_ID_MIN_LEN..=TRACKER_ID_MAX_LEN).contains(&len) {
                Some(id)
            } else {
                fields.issue(
                    "trackerId",
                    format!(
                        "String must contain between {} and {} character(s)",
                        TRACKER_ID_MIN_LEN, TRACKER_ID_MAX_LEN
                    ),
                );
                None
            }
        });

        let scroll_depth = fields
            .required_number("scrollDepth")
            .and_then(|n| fields.in_range("scrollDepth", n, 0.0, 100.0))
            .map(|n| n.round() as i32);

        let page_url = fields
            .required_string("pageUrl")
            .and_then(|url| match validate_url(&url) {
                Ok(_) => Some(url),
                Err(e) => {
                    fields.issue("pageUrl", e.to_string());
                    None
                }
            });

        let occurred_at = fields.required_number("timestamp").and_then(|n| {
            if n.fract() != 0.0 || n <= 0.0 {
                fields.issue("timestamp", "Expected positive integer (epoch milliseconds)");
                return None;
            }
            match Utc.timestamp_millis_opt(n as i64).single() {
                Some(ts) => Some(ts),
                None => {
                    fields.issue("timestamp", "Timestamp out of range");
                    None
                }
            }
        });

        let time_on_page = fields.optional_millis("timeOnPage");
        let total_time_on_page = fields.optional_millis("totalTimeOnPage");
        let max_scroll_depth = fields
            .optional_number("maxScrollDepth")
            .and_then(|n| fields.in_range("maxScrollDepth", n, 0.0, 100.0))
            .map(|n| n.round() as i32);
        let scroll_events = fields
            .optional_integer("scrollEvents", 0, i64::from(i32::MAX))
            .map(|n| n as i32);

        let engagement = match obj.get("engagement") {
            None | Some(Value::Null) => None,
            Some(v @ Value::Object(_)) => Some(v.clone()),
            Some(_) => {
                fields.issue("engagement", "Expected object");
                None
            }
        };

        let (ua, viewport_w, viewport_h) = match obj.get("device") {
            None | Some(Value::Null) => (None, None, None),
            Some(Value::Object(device)) => {
                let mut device_fields = FieldReader {
                    obj: device,
                    prefix: "device.",
                    failure: &mut *fields.failure,
                };
                let ua = device_fields.optional_string("ua");
                let w = device_fields.optional_integer("width", 1, MAX_VIEWPORT);
                let h = device_fields.optional_integer("height", 1, MAX_VIEWPORT);
                (ua, w.map(|w| w as i32), h.map(|h| h as i32))
            }
            Some(_) => {
                fields.issue("device", "Expected object");
                (None, None, None)
            }
        };

        match (tracker_id, scroll_depth, page_url, occurred_at) {
            (Some(tracker_id), Some(scroll_depth), Some(page_url), Some(occurred_at))
                if failure.issues.is_empty() =>
            {
                Ok(ValidatedEvent {
                    tracker_id,
                    scroll_depth,
                    page_url,
                    occurred_at,
                    time_on_page,
                    total_time_on_page,
                    max_scroll_depth,
                    scroll_events,
                    engagement,
                    ua,
                    viewport_w,
                    viewport_h,
                })
            }
            _ => Err(failure),
        }
    }
}

/// 按字段读取并记录问题
struct FieldReader<'a, 'f> {
    obj: &'a Map<String, Value>,
    prefix: &'static str,
    failure: &'f mut ValidationFailure,
}

impl<'a> FieldReader<'a, '_> {
    fn issue(&mut self, key: &str, message: impl Into<String>) {
        self.failure.push(format!("{}{}", self.prefix, key), message);
    }

    /// 缺失与 null 都视为未提供
    fn present(&self, key: &str) -> Option<&'a Value> {
        self.obj.get(key).filter(|v| !v.is_null())
    }

    fn required_string(&mut self, key: &str) -> Option<String> {
        match self.present(key) {
            None => {
                self.issue(key, "Required");
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.issue(key, "Expected string");
                None
            }
        }
    }

    fn optional_string(&mut self, key: &str) -> Option<String> {
        match self.present(key) {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.issue(key, "Expected string");
                None
            }
        }
    }

    fn number(&mut self, key: &str, value: &Value) -> Option<f64> {
        match value.as_f64() {
            Some(n) if n.is_finite() => Some(n),
            _ => {
                self.issue(key, "Expected number");
                None
            }
        }
    }

    fn required_number(&mut self, key: &str) -> Option<f64> {
        match self.present(key) {
            None => {
                self.issue(key, "Required");
                None
            }
            Some(v) => self.number(key, v),
        }
    }

    fn optional_number(&mut self, key: &str) -> Option<f64> {
        let v = self.present(key)?;
        self.number(key, v)
    }

    fn in_range(&mut self, key: &str, n: f64, min: f64, max: f64) -> Option<f64> {
        if n < min || n > max {
            self.issue(key, format!("Number must be between {} and {}", min, max));
            None
        } else {
            Some(n)
        }
    }

    /// 非负毫秒值，小数四舍五入
    fn optional_millis(&mut self, key: &str) -> Option<i64> {
        let n = self.optional_number(key)?;
        if n < 0.0 {
            self.issue(key, "Number must be greater than or equal to 0");
            return None;
        }
        if n > i64::MAX as f64 {
            self.issue(key, "Number is too large");
            return None;
        }
        Some(n.round() as i64)
    }

    fn optional_integer(&mut self, key: &str, min: i64, max: i64) -> Option<i64> {
        let n = self.optional_number(key)?;
        if n.fract() != 0.0 {
            self.issue(key, "Expected integer");
            return None;
        }
        if n < min as f64 || n > max as f64 {
            self.issue(key, format!("Number must be between {} and {}", min, max));
            return None;
        }
        Some(n as i64)
    }
}

/// 上报服务：查找追踪器并写入事件
pub struct IngestService {
    storage: Arc<SeaOrmStorage>,
}

impl IngestService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 写入一条已校验的事件
    ///
    /// 追踪器不存在返回 NotFound，存储失败返回 DatabaseOperation
    pub async fn ingest(&self, event: ValidatedEvent, ip_address: String) -> Result<()> {
        let tracker = self.storage.find_tracker(&event.tracker_id).await?;
        if tracker.is_none() {
            debug!("Rejecting event for unknown tracker {}", event.tracker_id);
            return Err(ScrolldepthError::not_found(format!(
                "Unknown trackerId: {}",
                event.tracker_id
            )));
        }

        let new_event = event.into_new_event(ip_address);
        self.storage.insert_event(&new_event).await.inspect_err(|e| {
            error!(
                "Failed to store scroll event for tracker {}: {}",
                new_event.tracker_id, e
            );
        })
    }
}
