//! 会话重建与参与度指标
//!
//! 事件里没有会话 id。带有 totalTimeOnPage + maxScrollDepth 的事件视为会话总结，
//! 按 (总时长, 最大深度) 去重。两个不同会话恰好两个值都相同时会被合并成一个。

use std::collections::HashSet;

use serde::Serialize;

use super::{percent, round1};
use crate::storage::ScrollEvent;

/// 完整阅读阈值
const COMPLETION_DEPTH: i32 = 100;
/// "活跃"会话：深度与停留时间阈值
const ACTIVE_DEPTH: i32 = 75;
const ACTIVE_TIME_MS: i64 = 10_000;

/// 重建出的会话
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub total_time_on_page: i64,
    pub max_scroll_depth: i32,
    pub scroll_events: Option<i32>,
}

/// 从事件中重建会话，保留首次出现
pub fn reconstruct_sessions<'a, I>(events: I) -> Vec<Session>
where
    I: IntoIterator<Item = &'a ScrollEvent>,
{
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter_map(|e| match (e.total_time_on_page, e.max_scroll_depth) {
            (Some(total), Some(max_depth)) => Some(Session {
                total_time_on_page: total,
                max_scroll_depth: max_depth,
                scroll_events: e.scroll_events,
            }),
            _ => None,
        })
        .filter(|s| seen.insert((s.total_time_on_page, s.max_scroll_depth)))
        .collect()
}

/// 一组会话的参与度指标
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    pub sessions: usize,
    pub events: usize,
    /// 平均停留时间（秒，一位小数）
    pub avg_time_on_page: f64,
    /// 完整阅读率（%）
    pub completion_rate: u32,
    /// 活跃率（%）
    pub active_rate: u32,
    /// 平均每次滚动耗时（毫秒，一位小数）
    pub avg_scroll_speed: f64,
}

pub fn engagement_metrics(sessions: &[Session], event_count: usize) -> EngagementMetrics {
    if sessions.is_empty() {
        return EngagementMetrics {
            events: event_count,
            ..EngagementMetrics::default()
        };
    }

    let n = sessions.len();
    let total_ms: i64 = sessions.iter().map(|s| s.total_time_on_page).sum();
    let completed = sessions
        .iter()
        .filter(|s| s.max_scroll_depth >= COMPLETION_DEPTH)
        .count();
    let active = sessions
        .iter()
        .filter(|s| s.max_scroll_depth >= ACTIVE_DEPTH && s.total_time_on_page > ACTIVE_TIME_MS)
        .count();

    let speeds: Vec<f64> = sessions
        .iter()
        .filter_map(|s| match s.scroll_events {
            Some(count) if count > 0 => Some(s.total_time_on_page as f64 / count as f64),
            _ => None,
        })
        .collect();
    let avg_scroll_speed = if speeds.is_empty() {
        0.0
    } else {
        speeds.iter().sum::<f64>() / speeds.len() as f64
    };

    EngagementMetrics {
        sessions: n,
        events: event_count,
        avg_time_on_page: round1(total_ms as f64 / n as f64 / 1000.0),
        completion_rate: percent(completed, n),
        active_rate: percent(active, n),
        avg_scroll_speed: round1(avg_scroll_speed),
    }
}
