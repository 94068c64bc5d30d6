#![forbid(unsafe_code)]

use ot_core::model::NodeId;
use ot_core::time::{TimeSpan, ns_to_seconds};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationSummary {
    pub count: u64,
    pub first_ns: Option<i64>,
    pub last_ns: Option<i64>,
}

impl RegistrationSummary {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn span(&self) -> Option<TimeSpan> {
        TimeSpan::from_bounds(self.first_ns, self.last_ns)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NodeRegistrationRow {
    pub node_id: NodeId,
    pub registrations: u64,
    pub first_ns: i64,
    pub last_ns: i64,
}

impl NodeRegistrationRow {
    pub fn first_seconds(&self) -> f64 {
        ns_to_seconds(self.first_ns)
    }

    pub fn last_seconds(&self) -> f64 {
        ns_to_seconds(self.last_ns)
    }
}

/// Registrations falling in one timeline window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TimelineBucket {
    /// Centre of the window: every registration within half a width of this
    /// multiple of the width is counted here.
    pub window_s: f64,
    pub registrations: u64,
}
