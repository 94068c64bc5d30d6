#![forbid(unsafe_code)]

use ot_core::model::NodeId;
use ot_core::time::ns_to_seconds;
use serde::Serialize;

/// Per-node aggregate over `nodelocation`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NodeTrackingRow {
    pub node_id: NodeId,
    pub reports: u64,
    pub first_ns: i64,
    pub last_ns: i64,
    /// Mean sample time in seconds, rounded to one decimal.
    pub mean_s: f64,
}

impl NodeTrackingRow {
    pub fn first_seconds(&self) -> f64 {
        ns_to_seconds(self.first_ns)
    }

    pub fn last_seconds(&self) -> f64 {
        ns_to_seconds(self.last_ns)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LocationTotals {
    pub total_rows: u64,
    pub distinct_nodes: u64,
}
