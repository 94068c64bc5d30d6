#![forbid(unsafe_code)]

use ot_core::topology::TopologyError;
use ot_storage::StoreError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("topology {}: {source}", .path.display())]
    Topology {
        path: PathBuf,
        #[source]
        source: TopologyError,
    },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyzerError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(err) => err.code(),
            Self::Topology { .. } => "TOPOLOGY_INVALID",
            Self::Io { .. } => "IO",
            Self::Json(_) => "JSON",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Store(_) => 2,
            _ => 1,
        }
    }
}
