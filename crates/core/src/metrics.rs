#![forbid(unsafe_code)]

use crate::model::NodeId;
use crate::time::TimeSpan;
use serde::Serialize;
use std::collections::BTreeSet;

/// Divides, substituting zero when the denominator is zero or the result is
/// not finite.
pub fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() { ratio } else { 0.0 }
}

/// `observed / (active_nodes * duration_seconds)` as a percentage.
pub fn completeness_percent(observed: u64, active_nodes: u64, duration_seconds: f64) -> f64 {
    let expected = active_nodes as f64 * duration_seconds;
    if expected <= 0.0 {
        return 0.0;
    }
    guarded_ratio(observed as f64, expected) * 100.0
}

pub fn average_per_node(total_rows: u64, distinct_nodes: u64) -> f64 {
    guarded_ratio(total_rows as f64, distinct_nodes as f64)
}

pub fn tracking_duration_seconds(span: Option<TimeSpan>) -> f64 {
    span.map(|span| span.duration_seconds()).unwrap_or(0.0)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LocationStats {
    pub total_rows: u64,
    pub distinct_nodes: u64,
    pub avg_rows_per_node: f64,
}

impl LocationStats {
    pub fn new(total_rows: u64, distinct_nodes: u64) -> Self {
        Self {
            total_rows,
            distinct_nodes,
            avg_rows_per_node: average_per_node(total_rows, distinct_nodes),
        }
    }

    /// Aggregates `(node_id, row_count)` pairs. Node ids may repeat; their
    /// counts are summed and the node is counted once.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a (NodeId, u64)>) -> Self {
        let mut nodes = BTreeSet::new();
        let mut total_rows = 0u64;
        for (node_id, count) in rows {
            nodes.insert(*node_id);
            total_rows = total_rows.saturating_add(*count);
        }
        Self::new(total_rows, nodes.len() as u64)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Completeness {
    pub observed_positions: u64,
    pub active_nodes: u64,
    pub tracking_duration_s: f64,
    pub percent: f64,
}

impl Completeness {
    pub fn compute(observed_positions: u64, active_nodes: u64, span: Option<TimeSpan>) -> Self {
        let tracking_duration_s = tracking_duration_seconds(span);
        Self {
            observed_positions,
            active_nodes,
            tracking_duration_s,
            percent: completeness_percent(observed_positions, active_nodes, tracking_duration_s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completeness_with_no_active_nodes_is_zero() {
        assert_eq!(completeness_percent(500, 0, 97.0), 0.0);
    }

    #[test]
    fn completeness_with_zero_duration_is_zero() {
        assert_eq!(completeness_percent(500, 8, 0.0), 0.0);
        let c = Completeness::compute(10, 8, Some(TimeSpan::new(5, 5)));
        assert_eq!(c.tracking_duration_s, 0.0);
        assert_eq!(c.percent, 0.0);
    }

    #[test]
    fn completeness_with_empty_span_is_zero() {
        let c = Completeness::compute(0, 0, None);
        assert_eq!(c.percent, 0.0);
        assert_eq!(c.tracking_duration_s, 0.0);
    }

    #[test]
    fn completeness_one_sample_per_second() {
        // 8 nodes, one sample per second over 97 s.
        let span = TimeSpan::new(0, 97_000_000_000);
        let c = Completeness::compute(8 * 97, 8, Some(span));
        assert!((c.percent - 100.0).abs() < 1e-9);
        let half = Completeness::compute(4 * 97, 8, Some(span));
        assert!((half.percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn average_is_guarded() {
        assert_eq!(average_per_node(0, 0), 0.0);
        assert_eq!(average_per_node(10, 0), 0.0);
        assert_eq!(average_per_node(10, 4), 2.5);
    }

    #[test]
    fn location_stats_ignore_row_order() {
        let rows = vec![(3, 12u64), (1, 98), (2, 7), (8, 40)];
        let mut reversed = rows.clone();
        reversed.reverse();
        let mut shuffled = rows.clone();
        shuffled.swap(0, 2);
        shuffled.swap(1, 3);

        let a = LocationStats::from_rows(&rows);
        assert_eq!(a, LocationStats::from_rows(&reversed));
        assert_eq!(a, LocationStats::from_rows(&shuffled));
        assert_eq!(a.total_rows, 157);
        assert_eq!(a.distinct_nodes, 4);
        assert!((a.avg_rows_per_node - 39.25).abs() < 1e-12);
    }

    #[test]
    fn location_stats_merge_repeated_nodes() {
        let stats = LocationStats::from_rows(&[(1, 5u64), (1, 5), (2, 10)]);
        assert_eq!(stats.total_rows, 20);
        assert_eq!(stats.distinct_nodes, 2);
        assert_eq!(stats.avg_rows_per_node, 10.0);
    }

    #[test]
    fn guarded_ratio_rejects_non_finite() {
        assert_eq!(guarded_ratio(1.0, f64::NAN), 0.0);
        assert_eq!(guarded_ratio(1.0, f64::INFINITY), 0.0);
        assert_eq!(guarded_ratio(f64::INFINITY, 1.0), 0.0);
    }
}
