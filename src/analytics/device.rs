//! 设备分类
//!
//! 先用 UA 中的平板标记判断，再交给 woothee 解析；
//! 手机类 UA 在视口短边 >= 600px 时归为平板（大屏 Android、折叠屏）。

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};
use woothee::parser::Parser;

use super::sessions::{EngagementMetrics, engagement_metrics, reconstruct_sessions};
use crate::storage::ScrollEvent;

/// 一定是平板的 UA 片段（与视口无关）
const TABLET_MARKERS: &[&str] = &["iPad", "Tablet", "PlayBook", "Kindle", "Silk"];

/// 手机视口短边达到此值按平板处理
const TABLET_MIN_SHORT_SIDE: i32 = 600;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, AsRefStr, EnumIter,
)]
pub enum DeviceClass {
    Desktop,
    Mobile,
    Tablet,
    Unknown,
}

pub fn classify_device(ua: Option<&str>, width: Option<i32>, height: Option<i32>) -> DeviceClass {
    let Some(ua) = ua.map(str::trim).filter(|ua| !ua.is_empty()) else {
        return DeviceClass::Unknown;
    };

    if TABLET_MARKERS.iter().any(|marker| ua.contains(marker)) {
        return DeviceClass::Tablet;
    }
    if ua.contains("Android") && !ua.contains("Mobile") {
        return DeviceClass::Tablet;
    }

    let Some(parsed) = Parser::new().parse(ua) else {
        return DeviceClass::Unknown;
    };

    match parsed.category {
        "smartphone" | "mobilephone" => {
            let short_side = match (width, height) {
                (Some(w), Some(h)) => Some(w.min(h)),
                (Some(side), None) | (None, Some(side)) => Some(side),
                (None, None) => None,
            };
            if short_side.is_some_and(|side| side >= TABLET_MIN_SHORT_SIDE) {
                DeviceClass::Tablet
            } else {
                DeviceClass::Mobile
            }
        }
        "pc" => DeviceClass::Desktop,
        _ => DeviceClass::Unknown,
    }
}

/// 单个设备类别的统计
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceBreakdown {
    pub device: DeviceClass,
    #[serde(flatten)]
    pub engagement: EngagementMetrics,
}

/// 按设备类别分组后分别计算参与度，结果顺序固定（Desktop, Mobile, Tablet, Unknown），
/// 没有事件的类别不输出
pub fn device_breakdown(events: &[ScrollEvent]) -> Vec<DeviceBreakdown> {
    let classes: Vec<DeviceClass> = events
        .iter()
        .map(|e| classify_device(e.ua.as_deref(), e.viewport_w, e.viewport_h))
        .collect();

    DeviceClass::iter()
        .filter_map(|device| {
            let group: Vec<&ScrollEvent> = events
                .iter()
                .zip(&classes)
                .filter(|(_, class)| **class == device)
                .map(|(e, _)| e)
                .collect();
            if group.is_empty() {
                return None;
            }
            let sessions = reconstruct_sessions(group.iter().copied());
            Some(DeviceBreakdown {
                device,
                engagement: engagement_metrics(&sessions, group.len()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{event, session_event};

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";
    const ANDROID_PHONE: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const ANDROID_TABLET: &str = "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const WINDOWS_CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const GOOGLEBOT: &str =
        "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

    #[test]
    fn test_missing_or_blank_ua_is_unknown() {
        assert_eq!(classify_device(None, Some(1280), Some(800)), DeviceClass::Unknown);
        assert_eq!(classify_device(Some("  "), None, None), DeviceClass::Unknown);
    }

    #[test]
    fn test_ipad_is_tablet_regardless_of_viewport() {
        assert_eq!(classify_device(Some(IPAD), None, None), DeviceClass::Tablet);
        assert_eq!(
            classify_device(Some(IPAD), Some(320), Some(480)),
            DeviceClass::Tablet
        );
        assert_eq!(
            classify_device(Some(IPAD), Some(1920), Some(1080)),
            DeviceClass::Tablet
        );
    }

    #[test]
    fn test_android_without_mobile_is_tablet() {
        assert_eq!(
            classify_device(Some(ANDROID_TABLET), None, None),
            DeviceClass::Tablet
        );
        assert_eq!(
            classify_device(Some(ANDROID_PHONE), Some(412), Some(915)),
            DeviceClass::Mobile
        );
    }

    #[test]
    fn test_large_phone_viewport_becomes_tablet() {
        assert_eq!(
            classify_device(Some(IPHONE), Some(390), Some(844)),
            DeviceClass::Mobile
        );
        assert_eq!(
            classify_device(Some(IPHONE), Some(820), Some(1180)),
            DeviceClass::Tablet
        );
    }

    #[test]
    fn test_desktop_and_crawler() {
        assert_eq!(
            classify_device(Some(WINDOWS_CHROME), Some(1920), Some(1080)),
            DeviceClass::Desktop
        );
        assert_eq!(classify_device(Some(GOOGLEBOT), None, None), DeviceClass::Unknown);
    }

    #[test]
    fn test_classification_is_pure() {
        let first = classify_device(Some(IPHONE), Some(700), Some(700));
        for _ in 0..10 {
            assert_eq!(classify_device(Some(IPHONE), Some(700), Some(700)), first);
        }
    }

    #[test]
    fn test_device_breakdown_groups_per_class() {
        let with_ua = |mut e: ScrollEvent, ua: &str| {
            e.ua = Some(ua.to_string());
            e
        };
        let events = vec![
            with_ua(session_event(1, 20_000, 100, 5), WINDOWS_CHROME),
            with_ua(event(2, 40), WINDOWS_CHROME),
            with_ua(session_event(3, 3_000, 20, 1), IPAD),
            event(4, 10),
        ];

        let breakdown = device_breakdown(&events);
        let classes: Vec<DeviceClass> = breakdown.iter().map(|b| b.device).collect();
        assert_eq!(
            classes,
            vec![DeviceClass::Desktop, DeviceClass::Tablet, DeviceClass::Unknown]
        );

        let desktop = &breakdown[0].engagement;
        assert_eq!(desktop.events, 2);
        assert_eq!(desktop.sessions, 1);
        assert_eq!(desktop.completion_rate, 100);

        assert_eq!(breakdown[2].engagement.sessions, 0);
        assert_eq!(DeviceClass::Tablet.to_string(), "Tablet");
    }
}
