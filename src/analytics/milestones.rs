use serde::Serialize;

use super::percent;
use crate::storage::ScrollEvent;

/// 里程碑深度
pub const MILESTONES: [i32; 4] = [25, 50, 75, 100];

/// 达到各里程碑的事件占比（%）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Milestones {
    pub p25: u32,
    pub p50: u32,
    pub p75: u32,
    pub p100: u32,
    pub total: usize,
}

/// `count(depth >= m) * 100 / total`，向下取整
pub fn milestone_percentages(events: &[ScrollEvent]) -> Milestones {
    let total = events.len();
    let reached = |m: i32| events.iter().filter(|e| e.scroll_depth >= m).count();

    let [p25, p50, p75, p100] = MILESTONES.map(|m| percent(reached(m), total));
    Milestones {
        p25,
        p50,
        p75,
        p100,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::event;

    #[test]
    fn test_reference_scenario() {
        let events = vec![event(1, 20), event(2, 60), event(3, 100)];
        assert_eq!(
            milestone_percentages(&events),
            Milestones {
                p25: 66,
                p50: 66,
                p75: 33,
                p100: 33,
                total: 3,
            }
        );
    }

    #[test]
    fn test_empty_set_is_all_zero() {
        assert_eq!(milestone_percentages(&[]), Milestones::default());
    }

    #[test]
    fn test_percentages_are_monotonic() {
        let depths = [0, 3, 25, 26, 49, 50, 74, 75, 99, 100, 100, 12, 88];
        let events: Vec<_> = depths
            .iter()
            .enumerate()
            .map(|(i, d)| event(i as i64, *d))
            .collect();

        for n in 0..=events.len() {
            let m = milestone_percentages(&events[..n]);
            assert!(m.p25 >= m.p50 && m.p50 >= m.p75 && m.p75 >= m.p100);
        }
    }
}
