#![forbid(unsafe_code)]

use crate::error::AnalyzerError;
use crate::plan::{ModePlan, PositionSource, RunMode, Section};
use crate::scan::{self, ArtifactInventory};
use ot_core::classify::{GridPlacement, classify_node};
use ot_core::metrics::{Completeness, LocationStats};
use ot_core::model::{ClassifiedNode, NodeId, Position};
use ot_core::time::TimeSpan;
use ot_core::topology::{ReferenceTopology, TopologyReport};
use ot_storage::{
    NodeFilter, NodeRegistrationRow, NodeTrackingRow, RegistrationSummary, TelemetryStore,
    TimelineBucket,
};
use serde::Serialize;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub mode: RunMode,
    pub store: StoreInfo,
    pub sections: Vec<SectionReport>,
}

impl AnalysisReport {
    /// `Some(all_correct)` when the run included a topology check.
    pub fn topology_verdict(&self) -> Option<bool> {
        self.sections.iter().find_map(|section| match section {
            SectionReport::Topology(check) => Some(check.report.all_correct),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoreInfo {
    pub path: String,
    pub tables: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum SectionReport {
    Overview(Overview),
    Positions(PositionTable),
    RegistrationsByNode(RegistrationTable),
    Timeline(Timeline),
    Tracking(TrackingTable),
    Grid(GridTable),
    Topology(TopologyCheck),
    Artifacts(ArtifactSection),
    Performance(Performance),
    Summary(Summary),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Overview {
    pub total_nodes: u64,
    pub located_nodes: u64,
    pub registrations: u64,
    pub location_rows: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionTable {
    pub limit: Option<usize>,
    pub truncated: bool,
    pub rows: Vec<ClassifiedNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegistrationTable {
    pub filter: NodeFilter,
    pub limit: Option<usize>,
    pub truncated: bool,
    pub rows: Vec<NodeRegistrationRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Timeline {
    pub summary: RegistrationSummary,
    pub bucket_seconds: u32,
    pub limit: Option<usize>,
    pub truncated: bool,
    pub buckets: Vec<TimelineBucket>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackingTable {
    pub limit: Option<usize>,
    pub truncated: bool,
    pub show_mean: bool,
    pub rows: Vec<NodeTrackingRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GridEntry {
    pub node_id: NodeId,
    pub position: Position,
    pub placement: GridPlacement,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GridTable {
    pub limit: Option<usize>,
    pub truncated: bool,
    pub rows: Vec<GridEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopologyCheck {
    pub source: PositionSource,
    pub reference_nodes: usize,
    pub limit: Option<usize>,
    pub report: TopologyReport,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArtifactSection {
    pub detail: bool,
    pub inventory: ArtifactInventory,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Performance {
    pub filter: NodeFilter,
    pub span: Option<TimeSpan>,
    pub stats: LocationStats,
    pub completeness: Completeness,
    pub reference_nodes: usize,
    pub registrations: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub total_nodes: u64,
    pub active_nodes: u64,
    pub registrations: u64,
    pub capture_files: usize,
    pub capture_bytes: u64,
    pub store_bytes: u64,
    pub topology_all_correct: Option<bool>,
}

/// Runs every section of `plan` against `store`, in plan order.
pub fn run_analysis(
    store: &TelemetryStore,
    plan: &ModePlan,
    topology: &ReferenceTopology,
    work_dir: &Path,
) -> Result<AnalysisReport, AnalyzerError> {
    tracing::info!(mode = plan.mode.as_str(), filter = ?plan.filter, "analysis started");

    let inventory = if plan.needs_artifacts() {
        Some(scan::inventory(work_dir, store.path())?)
    } else {
        None
    };

    let mut sections = Vec::with_capacity(plan.sections.len());
    let mut topology_verdict = None;
    for section in &plan.sections {
        let report = match section {
            Section::Overview => SectionReport::Overview(overview(store, plan.filter)?),
            Section::Positions => {
                let latest = store.latest_positions(plan.filter, lookahead(plan.row_limit))?;
                let (rows, truncated) = cap(latest, plan.row_limit);
                SectionReport::Positions(PositionTable {
                    limit: plan.row_limit,
                    truncated,
                    rows: rows.iter().map(classify_node).collect(),
                })
            }
            Section::RegistrationsByNode => {
                let (rows, truncated) = cap(
                    store.registration_by_node(plan.filter, lookahead(plan.row_limit))?,
                    plan.row_limit,
                );
                SectionReport::RegistrationsByNode(RegistrationTable {
                    filter: plan.filter,
                    limit: plan.row_limit,
                    truncated,
                    rows,
                })
            }
            Section::Timeline => {
                let (buckets, truncated) = cap(
                    store.registration_timeline(
                        plan.filter,
                        plan.timeline_bucket_s,
                        lookahead(plan.row_limit),
                    )?,
                    plan.row_limit,
                );
                SectionReport::Timeline(Timeline {
                    summary: store.registration_summary(plan.filter)?,
                    bucket_seconds: plan.timeline_bucket_s,
                    limit: plan.row_limit,
                    truncated,
                    buckets,
                })
            }
            Section::Tracking => {
                let (rows, truncated) = cap(
                    store.location_summary_by_node(plan.filter, lookahead(plan.row_limit))?,
                    plan.row_limit,
                );
                SectionReport::Tracking(TrackingTable {
                    limit: plan.row_limit,
                    truncated,
                    show_mean: plan.tracking_mean,
                    rows,
                })
            }
            Section::Grid => SectionReport::Grid(grid(store, plan)?),
            Section::Topology => {
                let check = topology_check(store, plan, topology)?;
                topology_verdict = Some(check.report.all_correct);
                SectionReport::Topology(check)
            }
            Section::Artifacts => SectionReport::Artifacts(ArtifactSection {
                detail: plan.artifact_detail,
                inventory: inventory.clone().unwrap_or_default(),
            }),
            Section::Performance => SectionReport::Performance(performance(store, plan, topology)?),
            Section::Summary => SectionReport::Summary(summary(
                store,
                plan.filter,
                inventory.as_ref(),
                topology_verdict,
            )?),
        };
        sections.push(report);
    }

    Ok(AnalysisReport {
        mode: plan.mode,
        store: StoreInfo {
            path: store.path().display().to_string(),
            tables: store.tables().to_vec(),
        },
        sections,
    })
}

fn overview(store: &TelemetryStore, filter: NodeFilter) -> Result<Overview, AnalyzerError> {
    let totals = store.location_totals(filter)?;
    Ok(Overview {
        total_nodes: store.count_nodes()?,
        located_nodes: totals.distinct_nodes,
        registrations: store.count_registrations(filter)?,
        location_rows: totals.total_rows,
    })
}

/// One row past `limit`, so the caller can tell whether anything was cut.
fn lookahead(limit: Option<usize>) -> Option<usize> {
    limit.map(|limit| limit.saturating_add(1))
}

fn cap<T>(mut rows: Vec<T>, limit: Option<usize>) -> (Vec<T>, bool) {
    match limit {
        Some(limit) if rows.len() > limit => {
            rows.truncate(limit);
            (rows, true)
        }
        _ => (rows, false),
    }
}

fn grid(store: &TelemetryStore, plan: &ModePlan) -> Result<GridTable, AnalyzerError> {
    let (positions, truncated) = cap(store.distinct_positions(plan.filter)?, plan.row_limit);
    let rows = positions
        .into_iter()
        .map(|row| GridEntry {
            node_id: row.node_id,
            position: row.position,
            placement: GridPlacement::of(row.position.x, row.position.y),
        })
        .collect();
    Ok(GridTable {
        limit: plan.row_limit,
        truncated,
        rows,
    })
}

fn topology_check(
    store: &TelemetryStore,
    plan: &ModePlan,
    topology: &ReferenceTopology,
) -> Result<TopologyCheck, AnalyzerError> {
    let observed = match plan.position_source {
        PositionSource::Latest => store.latest_positions(plan.filter, None)?,
        PositionSource::Distinct => store.distinct_positions(plan.filter)?,
    };
    let report = topology.validate(&observed);
    if !report.all_correct {
        tracing::warn!(
            mismatched = report.mismatched,
            "observed positions differ from the reference topology"
        );
    }
    Ok(TopologyCheck {
        source: plan.position_source,
        reference_nodes: topology.len(),
        limit: plan.row_limit,
        report,
    })
}

fn performance(
    store: &TelemetryStore,
    plan: &ModePlan,
    topology: &ReferenceTopology,
) -> Result<Performance, AnalyzerError> {
    let span = store.overall_time_span()?;
    let per_node = store
        .location_summary_by_node(plan.filter, None)?
        .iter()
        .map(|row| (row.node_id, row.reports))
        .collect::<Vec<_>>();
    let stats = LocationStats::from_rows(&per_node);
    Ok(Performance {
        filter: plan.filter,
        span,
        stats,
        completeness: Completeness::compute(stats.total_rows, stats.distinct_nodes, span),
        reference_nodes: topology.len(),
        registrations: store.count_registrations(plan.filter)?,
    })
}

fn summary(
    store: &TelemetryStore,
    filter: NodeFilter,
    inventory: Option<&ArtifactInventory>,
    topology_all_correct: Option<bool>,
) -> Result<Summary, AnalyzerError> {
    let store_bytes = match inventory {
        Some(inventory) => inventory.store_bytes,
        None => store.file_size()?,
    };
    Ok(Summary {
        total_nodes: store.count_nodes()?,
        active_nodes: store.count_located_nodes(filter)?,
        registrations: store.count_registrations(filter)?,
        capture_files: inventory.map_or(0, |inventory| inventory.captures.len()),
        capture_bytes: inventory.map_or(0, |inventory| inventory.capture_bytes),
        store_bytes,
        topology_all_correct,
    })
}
