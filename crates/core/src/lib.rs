#![forbid(unsafe_code)]

pub mod artifacts;
pub mod classify;
pub mod metrics;
pub mod topology;

pub mod time {
    use serde::Serialize;

    pub const NANOS_PER_SECOND: f64 = 1e9;

    /// Simulation timestamps are stored as integer nanoseconds since start.
    pub fn ns_to_seconds(value: i64) -> f64 {
        value as f64 / NANOS_PER_SECOND
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
    pub struct TimeSpan {
        pub min_ns: i64,
        pub max_ns: i64,
    }

    impl TimeSpan {
        pub fn new(min_ns: i64, max_ns: i64) -> Self {
            if min_ns <= max_ns {
                Self { min_ns, max_ns }
            } else {
                Self {
                    min_ns: max_ns,
                    max_ns: min_ns,
                }
            }
        }

        pub fn from_bounds(min_ns: Option<i64>, max_ns: Option<i64>) -> Option<Self> {
            match (min_ns, max_ns) {
                (Some(min_ns), Some(max_ns)) => Some(Self::new(min_ns, max_ns)),
                _ => None,
            }
        }

        pub fn start_seconds(&self) -> f64 {
            ns_to_seconds(self.min_ns)
        }

        pub fn end_seconds(&self) -> f64 {
            ns_to_seconds(self.max_ns)
        }

        pub fn duration_seconds(&self) -> f64 {
            ns_to_seconds(self.max_ns.saturating_sub(self.min_ns))
        }
    }
}

pub mod model {
    use serde::{Deserialize, Serialize};

    pub type NodeId = i64;

    #[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Position {
        pub x: f64,
        pub y: f64,
        pub z: f64,
    }

    impl Position {
        pub const fn new(x: f64, y: f64, z: f64) -> Self {
            Self { x, y, z }
        }
    }

    /// Shortest round-trip form of each coordinate, so positions that differ
    /// under exact comparison never print alike.
    impl std::fmt::Display for Position {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "({:?}, {:?}, {:?})", self.x, self.y, self.z)
        }
    }

    /// One `nodelocation` sample reduced to identity and coordinates.
    #[derive(Clone, Copy, Debug, PartialEq, Serialize)]
    pub struct NodePosition {
        pub node_id: NodeId,
        pub position: Position,
    }

    impl NodePosition {
        pub const fn new(node_id: NodeId, x: f64, y: f64, z: f64) -> Self {
            Self {
                node_id,
                position: Position::new(x, y, z),
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum NodeRole {
        NearRtRic,
        OCuCluster1,
        OCuCluster2,
        ODuLeo,
        Other,
    }

    impl NodeRole {
        pub fn as_str(self) -> &'static str {
            match self {
                NodeRole::NearRtRic => "near-rt-ric",
                NodeRole::OCuCluster1 => "o-cu-cluster-1",
                NodeRole::OCuCluster2 => "o-cu-cluster-2",
                NodeRole::ODuLeo => "o-du-leo",
                NodeRole::Other => "other",
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Serialize)]
    pub struct ClassifiedNode {
        pub node_id: NodeId,
        pub position: Position,
        pub role: NodeRole,
    }
}
