#![forbid(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store `{file_name}` not found (searched: {})", join_paths(.searched))]
    NotFound {
        file_name: String,
        searched: Vec<PathBuf>,
    },
    #[error(
        "store {} is missing required tables: {}",
        .path.display(),
        .missing.join(", ")
    )]
    MissingTables { path: PathBuf, missing: Vec<String> },
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "STORE_NOT_FOUND",
            Self::MissingTables { .. } | Self::Sql(_) => "STORE_UNREADABLE",
            Self::Io(_) => "IO",
            Self::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_unreadable(&self) -> bool {
        self.code() == "STORE_UNREADABLE"
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
