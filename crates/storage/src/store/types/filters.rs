#![forbid(unsafe_code)]

use ot_core::model::NodeId;
use serde::Serialize;

/// Restricts a query to a node id range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeFilter {
    #[default]
    All,
    UpTo(NodeId),
}

impl NodeFilter {
    /// Bound as `?1` in `(?1 IS NULL OR nodeid <= ?1)`.
    pub fn max_node_id(self) -> Option<NodeId> {
        match self {
            NodeFilter::All => None,
            NodeFilter::UpTo(max) => Some(max),
        }
    }
}
