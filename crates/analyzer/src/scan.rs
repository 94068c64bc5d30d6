#![forbid(unsafe_code)]

use crate::error::AnalyzerError;
use ot_core::artifacts::{ASCII_TRACE_NAME, ArtifactRecord, is_trace_capture};
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactInventory {
    pub captures: Vec<ArtifactRecord>,
    pub capture_bytes: u64,
    pub store_bytes: u64,
    pub ascii_trace_bytes: Option<u64>,
}

/// Trace captures directly inside `dir`, in lexical filename order.
pub fn scan(dir: &Path) -> Result<Vec<ArtifactRecord>, AnalyzerError> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| {
            let context = format!("listing {}", dir.display());
            AnalyzerError::io(context, err.into())
        })?;
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !is_trace_capture(name) || !entry.file_type().is_file() {
            continue;
        }
        let size = entry
            .metadata()
            .map_err(|err| AnalyzerError::io(format!("stat {name}"), err.into()))?
            .len();
        out.push(ArtifactRecord::new(name, size));
    }
    Ok(out)
}

pub fn inventory(dir: &Path, store_path: &Path) -> Result<ArtifactInventory, AnalyzerError> {
    let captures = scan(dir)?;
    let capture_bytes = captures.iter().map(|record| record.size_bytes).sum();
    let store_bytes = std::fs::metadata(store_path)
        .map_err(|err| AnalyzerError::io(format!("stat {}", store_path.display()), err))?
        .len();

    let trace_path = dir.join(ASCII_TRACE_NAME);
    let ascii_trace_bytes = match std::fs::metadata(&trace_path) {
        Ok(meta) if meta.is_file() => Some(meta.len()),
        Ok(_) => None,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %trace_path.display(), "no ascii trace");
            None
        }
        Err(err) => {
            return Err(AnalyzerError::io(
                format!("stat {}", trace_path.display()),
                err,
            ));
        }
    };

    tracing::debug!(
        captures = captures.len(),
        capture_bytes,
        "artifact scan complete"
    );
    Ok(ArtifactInventory {
        captures,
        capture_bytes,
        store_bytes,
        ascii_trace_bytes,
    })
}
