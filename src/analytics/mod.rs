//! 滚动深度聚合
//!
//! 纯函数：输入一组已加载的事件，输出 Dashboard 所需的统计结果。
//! 同一组事件重复计算得到相同结果。

pub mod device;
pub mod geo;
pub mod milestones;
pub mod sessions;
pub mod summary;

pub use device::{DeviceBreakdown, DeviceClass, classify_device, device_breakdown};
pub use geo::{CachedCountryLookup, CountryLookup, HashCountryLookup, assign_country};
pub use milestones::{MILESTONES, Milestones, milestone_percentages};
pub use sessions::{EngagementMetrics, Session, engagement_metrics, reconstruct_sessions};
pub use summary::{CountryCount, DashboardSummary, Visitor, summarize, unique_visitors};

/// 百分比，向下取整；total 为 0 时按 1 计算
pub(crate) fn percent(part: usize, total: usize) -> u32 {
    ((part * 100) / total.max(1)) as u32
}

/// 保留一位小数
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_truncates() {
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(5, 5), 100);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(12.345), 12.3);
        assert_eq!(round1(0.05), 0.1);
    }
}
