#![forbid(unsafe_code)]

use serde::Serialize;

pub const CAPTURE_PREFIX: &str = "oran-forwarding-";
pub const CAPTURE_SUFFIX: &str = ".pcap";
pub const ASCII_TRACE_NAME: &str = "oran-forwarding.tr";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactCategory {
    BackboneLink,
    Cluster1Internal,
    Cluster2Internal,
    Other,
}

impl ArtifactCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactCategory::BackboneLink => "backbone-link",
            ArtifactCategory::Cluster1Internal => "cluster-1-internal",
            ArtifactCategory::Cluster2Internal => "cluster-2-internal",
            ArtifactCategory::Other => "other",
        }
    }
}

/// First match wins: `backbone`, then `cluster1`, then `cluster2`.
pub fn categorize(file_name: &str) -> ArtifactCategory {
    if file_name.contains("backbone") {
        ArtifactCategory::BackboneLink
    } else if file_name.contains("cluster1") {
        ArtifactCategory::Cluster1Internal
    } else if file_name.contains("cluster2") {
        ArtifactCategory::Cluster2Internal
    } else {
        ArtifactCategory::Other
    }
}

/// Matches `oran-forwarding-*.pcap`.
pub fn is_trace_capture(file_name: &str) -> bool {
    file_name.len() >= CAPTURE_PREFIX.len() + CAPTURE_SUFFIX.len()
        && file_name.starts_with(CAPTURE_PREFIX)
        && file_name.ends_with(CAPTURE_SUFFIX)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactRecord {
    pub file_name: String,
    pub size_bytes: u64,
    pub category: ArtifactCategory,
}

impl ArtifactRecord {
    pub fn new(file_name: impl Into<String>, size_bytes: u64) -> Self {
        let file_name = file_name.into();
        let category = categorize(&file_name);
        Self {
            file_name,
            size_bytes,
            category,
        }
    }
}
