#![forbid(unsafe_code)]

use super::StoreError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_STORE_FILE_NAME: &str = "oran-forwarding-repository.db";

/// One way of turning a candidate store path into an existing file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// The candidate as given (relative paths resolve against the process cwd).
    Literal,
    /// The candidate joined onto a base directory, usually the tool's own.
    RelativeTo(PathBuf),
    /// Recursive search below a root for a file with the candidate's name.
    /// Shallower matches win; ties break on lexical path order.
    SearchTree(PathBuf),
}

impl ResolveStrategy {
    pub fn attempt(&self, candidate: &Path, file_name: &str) -> Option<PathBuf> {
        match self {
            Self::Literal => candidate.is_file().then(|| candidate.to_path_buf()),
            Self::RelativeTo(base) => {
                let path = base.join(candidate);
                path.is_file().then_some(path)
            }
            Self::SearchTree(root) => search_tree(root, file_name),
        }
    }

    fn describe(&self, candidate: &Path, file_name: &str) -> PathBuf {
        match self {
            Self::Literal => candidate.to_path_buf(),
            Self::RelativeTo(base) => base.join(candidate),
            Self::SearchTree(root) => root.join("**").join(file_name),
        }
    }
}

fn search_tree(root: &Path, file_name: &str) -> Option<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .min_by_key(|entry| entry.depth())
        .map(|entry| entry.into_path())
}

/// The directory holding the running executable, if it can be determined.
pub fn tool_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()?
        .parent()
        .map(Path::to_path_buf)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreLocator {
    file_name: String,
    strategies: Vec<ResolveStrategy>,
}

impl StoreLocator {
    pub fn new(file_name: impl Into<String>, strategies: Vec<ResolveStrategy>) -> Self {
        Self {
            file_name: file_name.into(),
            strategies,
        }
    }

    /// Literal path, then next to the executable, then a search of `work_dir`.
    pub fn default_for(work_dir: &Path) -> Self {
        let mut strategies = vec![ResolveStrategy::Literal];
        if let Some(dir) = tool_dir() {
            strategies.push(ResolveStrategy::RelativeTo(dir));
        }
        strategies.push(ResolveStrategy::SearchTree(work_dir.to_path_buf()));
        Self::new(DEFAULT_STORE_FILE_NAME, strategies)
    }

    pub fn strategies(&self) -> &[ResolveStrategy] {
        &self.strategies
    }

    /// Tries each strategy in order; the first existing file wins.
    pub fn resolve(&self, candidate: &Path) -> Result<PathBuf, StoreError> {
        let file_name = candidate
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.file_name);

        let mut searched = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            let described = strategy.describe(candidate, file_name);
            tracing::debug!(strategy = ?strategy, path = %described.display(), "resolving store");
            if let Some(found) = strategy.attempt(candidate, file_name) {
                tracing::info!(path = %found.display(), "using store");
                return Ok(found);
            }
            searched.push(described);
        }

        Err(StoreError::NotFound {
            file_name: file_name.to_string(),
            searched,
        })
    }
}
