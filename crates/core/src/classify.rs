#![forbid(unsafe_code)]

use crate::model::{ClassifiedNode, NodePosition, NodeRole};
use serde::Serialize;

const RIC_MIN_Z: f64 = 400.0;
const LEO_MAX_Z: f64 = 200.0;
const CLUSTER_1_X: (f64, f64) = (-200.0, -100.0);
const CLUSTER_2_X: (f64, f64) = (200.0, 300.0);
const GRID_CLUSTER_SPLIT_X: f64 = 150.0;

/// Maps a coordinate to its role. Rule order is significant: the altitude
/// check runs first, the cluster windows only apply below `LEO_MAX_Z`.
pub fn classify(x: f64, y: f64, z: f64) -> NodeRole {
    if z > RIC_MIN_Z {
        return NodeRole::NearRtRic;
    }
    if z < LEO_MAX_Z {
        if x > CLUSTER_1_X.0 && x < CLUSTER_1_X.1 && y < 0.0 {
            return NodeRole::OCuCluster1;
        }
        if x > CLUSTER_2_X.0 && x < CLUSTER_2_X.1 && y < 0.0 {
            return NodeRole::OCuCluster2;
        }
        return NodeRole::ODuLeo;
    }
    NodeRole::Other
}

pub fn classify_node(node: &NodePosition) -> ClassifiedNode {
    let p = node.position;
    ClassifiedNode {
        node_id: node.node_id,
        position: p,
        role: classify(p.x, p.y, p.z),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridCluster {
    Cluster1,
    Cluster2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridRow {
    Upper,
    Lower,
}

/// Where a node sits in the two-cluster satellite grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GridPlacement {
    pub cluster: GridCluster,
    pub row: GridRow,
}

impl GridPlacement {
    pub fn of(x: f64, y: f64) -> Self {
        let cluster = if x < GRID_CLUSTER_SPLIT_X {
            GridCluster::Cluster1
        } else {
            GridCluster::Cluster2
        };
        let row = if y < 0.0 { GridRow::Upper } else { GridRow::Lower };
        Self { cluster, row }
    }

    pub fn label(&self) -> String {
        let cluster = match self.cluster {
            GridCluster::Cluster1 => "cluster-1",
            GridCluster::Cluster2 => "cluster-2",
        };
        let row = match self.row {
            GridRow::Upper => "upper",
            GridRow::Lower => "lower",
        };
        format!("{cluster}/{row}")
    }
}
