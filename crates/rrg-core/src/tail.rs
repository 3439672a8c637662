//! Trailing-point history windows

use serde::{Deserialize, Serialize};

use crate::types::{clamp_index, Point, TimePoint};

/// Default number of trailing dates
pub const DEFAULT_TAIL_LENGTH: usize = 5;
/// Longest tail the data API ever supplies history for
pub const MAX_TAIL_LENGTH: usize = 20;

/// Chronological (rs_ratio, rs_momentum) trace of one entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tail {
    pub points: Vec<Point>,
}

impl Tail {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    pub fn as_pairs(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.x, p.y)).collect()
    }
}

/// Clamp a user-supplied tail length into `1..=MAX_TAIL_LENGTH`
pub fn clamp_tail_length(tail_length: usize) -> usize {
    tail_length.clamp(1, MAX_TAIL_LENGTH)
}

/// Collect the entity's points over the `tail_length` dates ending at
/// `at_index` (inclusive).
///
/// Dates where the entity is missing or non-finite are skipped, so the tail
/// can be shorter than `tail_length`. `at_index` past the end is clamped and
/// a zero `tail_length` is treated as 1.
pub fn compute_tail(series: &[TimePoint], entity_id: &str, at_index: usize, tail_length: usize) -> Tail {
    if series.is_empty() {
        return Tail::default();
    }

    let end = clamp_index(at_index, series.len());
    let start = (end + 1).saturating_sub(tail_length.max(1));

    let points = series[start..=end]
        .iter()
        .filter_map(|tp| tp.entity(entity_id))
        .filter_map(|e| e.point().ok())
        .collect();

    Tail { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Entity;
    use chrono::NaiveDate;

    fn day(d: u32, entities: Vec<Entity>) -> TimePoint {
        TimePoint::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap(), entities)
    }

    fn ten_days() -> Vec<TimePoint> {
        (1..=10)
            .map(|d| day(d, vec![Entity::new("A", "A", 100.0 + d as f64, 100.0 - d as f64)]))
            .collect()
    }

    #[test]
    fn test_worked_example() {
        let series = vec![
            day(1, vec![Entity::new("A", "A", 105.0, 95.0)]),
            day(2, vec![Entity::new("A", "A", 110.0, 90.0)]),
        ];
        let tail = compute_tail(&series, "A", 1, 5);
        assert_eq!(tail.as_pairs(), vec![(105.0, 95.0), (110.0, 90.0)]);
    }

    #[test]
    fn test_window_ends_at_index() {
        let series = ten_days();
        let tail = compute_tail(&series, "A", 6, 3);
        assert_eq!(tail.as_pairs(), vec![(105.0, 95.0), (106.0, 94.0), (107.0, 93.0)]);
    }

    #[test]
    fn test_length_bounded_and_ordered() {
        let series = ten_days();
        for at in 0..series.len() {
            for len in 1..=12 {
                let tail = compute_tail(&series, "A", at, len);
                assert!(tail.len() <= len);
                assert!(tail.points.windows(2).all(|w| w[0].x < w[1].x));
            }
        }
    }

    #[test]
    fn test_gaps_are_skipped_not_filled() {
        let series = vec![
            day(1, vec![Entity::new("A", "A", 101.0, 99.0)]),
            day(2, vec![Entity::new("B", "B", 90.0, 90.0)]),
            day(3, vec![Entity::new("A", "A", f64::NAN, 98.0)]),
            day(4, vec![Entity::new("A", "A", 103.0, 97.0)]),
        ];
        let tail = compute_tail(&series, "A", 3, 4);
        assert_eq!(tail.as_pairs(), vec![(101.0, 99.0), (103.0, 97.0)]);
    }

    #[test]
    fn test_absent_entity_yields_empty_tail() {
        let series = ten_days();
        assert!(compute_tail(&series, "ZZZ", 9, 5).is_empty());
        assert!(compute_tail(&[], "A", 0, 5).is_empty());
    }

    #[test]
    fn test_out_of_range_index_and_zero_length() {
        let series = ten_days();
        let tail = compute_tail(&series, "A", 99, 2);
        assert_eq!(tail.as_pairs(), vec![(109.0, 91.0), (110.0, 90.0)]);

        let single = compute_tail(&series, "A", 0, 0);
        assert_eq!(single.as_pairs(), vec![(101.0, 99.0)]);
    }

    #[test]
    fn test_clamp_tail_length() {
        assert_eq!(clamp_tail_length(0), 1);
        assert_eq!(clamp_tail_length(5), 5);
        assert_eq!(clamp_tail_length(60), MAX_TAIL_LENGTH);
    }
}
