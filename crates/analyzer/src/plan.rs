#![forbid(unsafe_code)]

use ot_core::topology::ReferenceTopology;
use ot_storage::NodeFilter;
use serde::Serialize;

pub const TIMELINE_BUCKET_S: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Full,
    Detailed,
    Quick,
    Validate,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Full => "full analysis",
            RunMode::Detailed => "detailed per-node analysis",
            RunMode::Quick => "quick summary",
            RunMode::Validate => "position validation",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Overview,
    Positions,
    RegistrationsByNode,
    Timeline,
    Tracking,
    Grid,
    Topology,
    Artifacts,
    Performance,
    Summary,
}

/// Which positions the topology check compares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSource {
    /// Latest sample per node.
    Latest,
    /// Every distinct coordinate ever reported.
    Distinct,
}

/// A run mode reduced to the sections it emits and how much of each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModePlan {
    pub mode: RunMode,
    pub sections: Vec<Section>,
    pub filter: NodeFilter,
    pub row_limit: Option<usize>,
    pub timeline_bucket_s: u32,
    pub position_source: PositionSource,
    pub artifact_detail: bool,
    pub tracking_mean: bool,
}

impl ModePlan {
    pub fn for_mode(mode: RunMode, topology: &ReferenceTopology) -> Self {
        use Section::*;
        let base = Self {
            mode,
            sections: Vec::new(),
            filter: NodeFilter::All,
            row_limit: Some(10),
            timeline_bucket_s: TIMELINE_BUCKET_S,
            position_source: PositionSource::Latest,
            artifact_detail: true,
            tracking_mean: false,
        };
        match mode {
            RunMode::Full => Self {
                sections: vec![
                    Overview,
                    Positions,
                    Timeline,
                    Tracking,
                    Topology,
                    Artifacts,
                    Performance,
                    Summary,
                ],
                ..base
            },
            RunMode::Detailed => Self {
                sections: vec![
                    RegistrationsByNode,
                    Tracking,
                    Grid,
                    Timeline,
                    Performance,
                    Summary,
                ],
                filter: topology
                    .max_node_id()
                    .map(NodeFilter::UpTo)
                    .unwrap_or(NodeFilter::All),
                tracking_mean: true,
                ..base
            },
            RunMode::Quick => Self {
                sections: vec![Overview, Positions, Artifacts, Summary],
                row_limit: Some(8),
                artifact_detail: false,
                ..base
            },
            RunMode::Validate => Self {
                sections: vec![Topology],
                row_limit: None,
                position_source: PositionSource::Distinct,
                ..base
            },
        }
    }

    pub fn with_row_limit(mut self, row_limit: Option<usize>) -> Self {
        self.row_limit = row_limit;
        self
    }

    pub fn includes(&self, section: Section) -> bool {
        self.sections.contains(&section)
    }

    pub fn needs_artifacts(&self) -> bool {
        self.includes(Section::Artifacts) || self.includes(Section::Summary)
    }
}
