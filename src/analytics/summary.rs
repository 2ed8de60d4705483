use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::device::{DeviceBreakdown, device_breakdown};
use super::geo::{CachedCountryLookup, CountryLookup};
use super::milestones::{Milestones, milestone_percentages};
use super::sessions::{EngagementMetrics, engagement_metrics, reconstruct_sessions};
use crate::storage::ScrollEvent;
use crate::utils::ip::UNKNOWN_IP;

/// 窗口内的唯一访客（按网络地址）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    pub ip: String,
    pub country: String,
    pub events: usize,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub visitors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub milestones: Milestones,
    pub overall: EngagementMetrics,
    pub devices: Vec<DeviceBreakdown>,
    pub visitors: Vec<Visitor>,
    pub countries: Vec<CountryCount>,
    pub total_events: usize,
}

/// 汇总一组事件
///
/// `events` 为最近 N 条事件，`visitor_events` 为活跃窗口内的事件
pub fn summarize(
    events: &[ScrollEvent],
    visitor_events: &[ScrollEvent],
    lookup: &dyn CountryLookup,
) -> DashboardSummary {
    let sessions = reconstruct_sessions(events);
    let visitors = unique_visitors(visitor_events, lookup);

    let mut per_country: HashMap<&str, usize> = HashMap::new();
    for visitor in &visitors {
        *per_country.entry(visitor.country.as_str()).or_insert(0) += 1;
    }
    let mut countries: Vec<CountryCount> = per_country
        .into_iter()
        .map(|(country, visitors)| CountryCount {
            country: country.to_string(),
            visitors,
        })
        .collect();
    countries.sort_by(|a, b| b.visitors.cmp(&a.visitors).then(a.country.cmp(&b.country)));

    DashboardSummary {
        milestones: milestone_percentages(events),
        overall: engagement_metrics(&sessions, events.len()),
        devices: device_breakdown(events),
        visitors,
        countries,
        total_events: events.len(),
    }
}

/// 按地址去重的访客列表，最近活跃的在前
///
/// 没有地址或地址为 `"unknown"` 的事件不计入
pub fn unique_visitors(events: &[ScrollEvent], lookup: &dyn CountryLookup) -> Vec<Visitor> {
    let lookup = CachedCountryLookup::new(lookup);
    let mut by_ip: HashMap<&str, (usize, DateTime<Utc>)> = HashMap::new();

    for event in events {
        let Some(ip) = event
            .ip_address
            .as_deref()
            .filter(|ip| !ip.is_empty() && *ip != UNKNOWN_IP)
        else {
            continue;
        };
        let entry = by_ip.entry(ip).or_insert((0, event.occurred_at));
        entry.0 += 1;
        entry.1 = entry.1.max(event.occurred_at);
    }

    let mut visitors: Vec<Visitor> = by_ip
        .into_iter()
        .map(|(ip, (count, last_seen))| Visitor {
            ip: ip.to_string(),
            country: lookup.country(ip),
            events: count,
            last_seen,
        })
        .collect();
    visitors.sort_by(|a, b| b.last_seen.cmp(&a.last_seen).then(a.ip.cmp(&b.ip)));
    visitors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::geo::{HashCountryLookup, assign_country};
    use crate::analytics::test_support::{event, session_event};

    fn from_ip(mut e: ScrollEvent, ip: &str) -> ScrollEvent {
        e.ip_address = Some(ip.to_string());
        e
    }

    #[test]
    fn test_summary_reference_scenario() {
        let events = vec![event(1, 20), event(2, 60), event(3, 100)];
        let summary = summarize(&events, &[], &HashCountryLookup);

        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.milestones.p25, 66);
        assert_eq!(summary.milestones.p100, 33);
        assert_eq!(summary.overall.sessions, 0);
        assert!(summary.visitors.is_empty());
    }

    #[test]
    fn test_visitors_are_unique_per_address() {
        let events = vec![
            from_ip(event(1, 10), "203.0.113.7"),
            from_ip(event(2, 30), "203.0.113.7"),
            from_ip(event(3, 50), "198.51.100.2"),
            from_ip(event(4, 50), UNKNOWN_IP),
            event(5, 70),
        ];

        let visitors = unique_visitors(&events, &HashCountryLookup);
        assert_eq!(visitors.len(), 2);
        // most recent first
        assert_eq!(visitors[0].ip, "198.51.100.2");
        assert_eq!(visitors[1].events, 2);
        assert_eq!(visitors[1].last_seen, events[1].occurred_at);
        assert_eq!(visitors[1].country, assign_country("203.0.113.7"));
    }

    #[test]
    fn test_country_counts_sorted_descending() {
        let ips = ["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4", "10.0.0.5"];
        let events: Vec<_> = ips
            .iter()
            .enumerate()
            .map(|(i, ip)| from_ip(event(i as i64, 0), ip))
            .collect();

        let summary = summarize(&[], &events, &HashCountryLookup);
        let total: usize = summary.countries.iter().map(|c| c.visitors).sum();
        assert_eq!(total, ips.len());
        assert!(
            summary
                .countries
                .windows(2)
                .all(|w| w[0].visitors >= w[1].visitors)
        );
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let events = vec![
            from_ip(session_event(1, 15_000, 100, 5), "203.0.113.7"),
            from_ip(event(2, 45), "198.51.100.2"),
            session_event(3, 2_000, 30, 2),
        ];

        let first = summarize(&events, &events, &HashCountryLookup);
        let second = summarize(&events, &events, &HashCountryLookup);
        assert_eq!(first, second);
    }
}
