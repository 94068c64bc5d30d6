#![forbid(unsafe_code)]

use crate::model::{NodeId, Position};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("topology file is not valid json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("topology lists no nodes")]
    Empty,
    #[error("topology lists node {0} more than once")]
    DuplicateNode(NodeId),
}

/// Expected placement of every known node, keyed by node id.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceTopology {
    nodes: BTreeMap<NodeId, Position>,
}

#[derive(Deserialize)]
struct TopologyFile {
    nodes: Vec<TopologyFileNode>,
}

#[derive(Deserialize)]
struct TopologyFileNode {
    node_id: NodeId,
    x: f64,
    y: f64,
    z: f64,
}

impl ReferenceTopology {
    pub fn try_new(
        entries: impl IntoIterator<Item = (NodeId, Position)>,
    ) -> Result<Self, TopologyError> {
        let mut nodes = BTreeMap::new();
        for (node_id, position) in entries {
            if nodes.insert(node_id, position).is_some() {
                return Err(TopologyError::DuplicateNode(node_id));
            }
        }
        if nodes.is_empty() {
            return Err(TopologyError::Empty);
        }
        Ok(Self { nodes })
    }

    /// The 4x2 satellite grid: two clusters of three DUs and one CU each,
    /// all on the z=100 LEO plane.
    pub fn oran_grid() -> Self {
        let nodes = [
            (1, Position::new(-250.0, -50.0, 100.0)),
            (2, Position::new(-250.0, 50.0, 100.0)),
            (3, Position::new(-150.0, 50.0, 100.0)),
            (4, Position::new(-150.0, -50.0, 100.0)),
            (5, Position::new(150.0, -50.0, 100.0)),
            (6, Position::new(150.0, 50.0, 100.0)),
            (7, Position::new(250.0, 50.0, 100.0)),
            (8, Position::new(250.0, -50.0, 100.0)),
        ];
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, TopologyError> {
        let file: TopologyFile = serde_json::from_str(text)?;
        Self::try_new(
            file.nodes
                .into_iter()
                .map(|node| (node.node_id, Position::new(node.x, node.y, node.z))),
        )
    }

    pub fn expected(&self, node_id: NodeId) -> Option<Position> {
        self.nodes.get(&node_id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn max_node_id(&self) -> Option<NodeId> {
        self.nodes.keys().next_back().copied()
    }
}

impl Default for ReferenceTopology {
    fn default() -> Self {
        Self::oran_grid()
    }
}
