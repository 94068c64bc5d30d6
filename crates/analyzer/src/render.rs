#![forbid(unsafe_code)]

use crate::analysis::{
    AnalysisReport, ArtifactSection, GridTable, Overview, Performance, PositionTable,
    RegistrationTable, SectionReport, Summary, Timeline, TopologyCheck, TrackingTable,
};
use crate::error::AnalyzerError;
use crate::plan::PositionSource;
use ot_storage::NodeFilter;

const RULE_WIDTH: usize = 60;

pub fn render_json(report: &AnalysisReport) -> Result<String, AnalyzerError> {
    let mut out = serde_json::to_string_pretty(report)?;
    out.push('\n');
    Ok(out)
}

/// Plain-text report. Output depends only on `report`.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(
        "=== O-RAN forwarding telemetry: {} ===",
        report.mode.as_str()
    ));
    lines.push(format!("store:  {}", report.store.path));
    lines.push(format!("tables: {}", report.store.tables.join(", ")));

    for section in &report.sections {
        lines.push(String::new());
        match section {
            SectionReport::Overview(s) => overview(&mut lines, s),
            SectionReport::Positions(s) => positions(&mut lines, s),
            SectionReport::RegistrationsByNode(s) => registrations_by_node(&mut lines, s),
            SectionReport::Timeline(s) => timeline(&mut lines, s),
            SectionReport::Tracking(s) => tracking(&mut lines, s),
            SectionReport::Grid(s) => grid(&mut lines, s),
            SectionReport::Topology(s) => topology(&mut lines, s),
            SectionReport::Artifacts(s) => artifacts(&mut lines, s),
            SectionReport::Performance(s) => performance(&mut lines, s),
            SectionReport::Summary(s) => summary(&mut lines, s),
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn heading(lines: &mut Vec<String>, title: &str) {
    lines.push(format!("--- {title} ---"));
}

fn rule(lines: &mut Vec<String>) {
    lines.push("-".repeat(RULE_WIDTH));
}

fn no_data(lines: &mut Vec<String>, what: &str) {
    lines.push(format!("  (no {what})"));
}

fn truncation_note(lines: &mut Vec<String>, shown: usize, truncated: bool) {
    if truncated {
        lines.push(format!("  (showing first {shown} rows)"));
    }
}

fn kib(bytes: u64) -> String {
    format!("{:.1}KB", bytes as f64 / 1024.0)
}

fn filter_label(filter: NodeFilter) -> String {
    match filter {
        NodeFilter::All => "all nodes".to_string(),
        NodeFilter::UpTo(max) => format!("nodes 1..={max}"),
    }
}

fn overview(lines: &mut Vec<String>, s: &Overview) {
    heading(lines, "Node registration overview");
    lines.push(format!("nodes registered:      {}", s.total_nodes));
    lines.push(format!("nodes with positions:  {}", s.located_nodes));
    lines.push(format!("registration events:   {}", s.registrations));
    lines.push(format!("position records:      {}", s.location_rows));
}

fn positions(lines: &mut Vec<String>, s: &PositionTable) {
    heading(lines, "Node positions (latest sample)");
    if s.rows.is_empty() {
        no_data(lines, "position data");
        return;
    }
    lines.push(format!(
        "{:>6} | {:>8} | {:>8} | {:>8} | role",
        "node", "x", "y", "z"
    ));
    rule(lines);
    for row in &s.rows {
        lines.push(format!(
            "{:>6} | {:>8.1} | {:>8.1} | {:>8.1} | {}",
            row.node_id,
            row.position.x,
            row.position.y,
            row.position.z,
            row.role.as_str()
        ));
    }
    truncation_note(lines, s.rows.len(), s.truncated);
}

fn registrations_by_node(lines: &mut Vec<String>, s: &RegistrationTable) {
    heading(
        lines,
        &format!("Registration timeline per node ({})", filter_label(s.filter)),
    );
    if s.rows.is_empty() {
        no_data(lines, "registration records");
        return;
    }
    lines.push(format!(
        "{:>6} | {:>9} | {:>9} | {:>13}",
        "node", "first", "last", "registrations"
    ));
    rule(lines);
    for row in &s.rows {
        lines.push(format!(
            "{:>6} | {:>8.1}s | {:>8.1}s | {:>13}",
            row.node_id,
            row.first_seconds(),
            row.last_seconds(),
            row.registrations
        ));
    }
    truncation_note(lines, s.rows.len(), s.truncated);
}

fn timeline(lines: &mut Vec<String>, s: &Timeline) {
    heading(lines, "Registration timeline");
    if s.summary.is_empty() {
        lines.push("no registration records".to_string());
        return;
    }
    lines.push(format!("registration events:   {}", s.summary.count));
    if let Some(span) = s.summary.span() {
        lines.push(format!("first registration:    {:.1}s", span.start_seconds()));
        lines.push(format!("last registration:     {:.1}s", span.end_seconds()));
    }
    lines.push(format!(
        "{:>10} | {:>13}",
        format!("centre ±{}s", f64::from(s.bucket_seconds) / 2.0),
        "registrations"
    ));
    rule(lines);
    for bucket in &s.buckets {
        lines.push(format!(
            "{:>9.0}s | {:>13}",
            bucket.window_s, bucket.registrations
        ));
    }
    truncation_note(lines, s.buckets.len(), s.truncated);
}

fn tracking(lines: &mut Vec<String>, s: &TrackingTable) {
    heading(lines, "Position tracking per node");
    if s.rows.is_empty() {
        no_data(lines, "position reports");
        return;
    }
    if s.show_mean {
        lines.push(format!(
            "{:>6} | {:>8} | {:>9} | {:>9} | {:>9}",
            "node", "reports", "first", "last", "mean"
        ));
    } else {
        lines.push(format!(
            "{:>6} | {:>8} | {:>9} | {:>9}",
            "node", "reports", "first", "last"
        ));
    }
    rule(lines);
    for row in &s.rows {
        let mut line = format!(
            "{:>6} | {:>8} | {:>8.1}s | {:>8.1}s",
            row.node_id,
            row.reports,
            row.first_seconds(),
            row.last_seconds()
        );
        if s.show_mean {
            line.push_str(&format!(" | {:>8.1}s", row.mean_s));
        }
        lines.push(line);
    }
    truncation_note(lines, s.rows.len(), s.truncated);
}

fn grid(lines: &mut Vec<String>, s: &GridTable) {
    heading(lines, "Satellite grid layout");
    if s.rows.is_empty() {
        no_data(lines, "position data");
        return;
    }
    lines.push(format!(
        "{:>6} | {:>6} | {:>6} | {:>6} | placement",
        "node", "x", "y", "z"
    ));
    rule(lines);
    for row in &s.rows {
        lines.push(format!(
            "{:>6} | {:>6.0} | {:>6.0} | {:>6.0} | {}",
            row.node_id,
            row.position.x,
            row.position.y,
            row.position.z,
            row.placement.label()
        ));
    }
    truncation_note(lines, s.rows.len(), s.truncated);
}

fn topology(lines: &mut Vec<String>, s: &TopologyCheck) {
    let source = match s.source {
        PositionSource::Latest => "latest positions",
        PositionSource::Distinct => "every reported position",
    };
    heading(lines, &format!("Topology check ({source})"));
    if s.report.results.is_empty() {
        no_data(lines, "position data");
    } else {
        lines.push(format!(
            "{:>6} | {:<24} | {:<24} | result",
            "node", "actual", "expected"
        ));
        rule(lines);
        let shown = s.limit.unwrap_or(usize::MAX);
        for result in s.report.results.iter().take(shown) {
            let expected = result
                .expected
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!(
                "{:>6} | {:<24} | {:<24} | {}",
                result.node_id,
                result.actual.to_string(),
                expected,
                result.outcome.as_str()
            ));
        }
        if s.report.results.len() > shown {
            lines.push(format!(
                "  (showing first {shown} of {} rows)",
                s.report.results.len()
            ));
        }
    }
    lines.push(format!(
        "matched {} / mismatched {} / unknown {} (reference holds {} nodes)",
        s.report.matched, s.report.mismatched, s.report.unknown, s.reference_nodes
    ));
    if s.report.all_correct {
        lines.push("all positions match the reference topology".to_string());
    } else {
        lines.push("positions differ from the reference topology".to_string());
    }
}

fn artifacts(lines: &mut Vec<String>, s: &ArtifactSection) {
    heading(lines, "Trace artifacts");
    let inv = &s.inventory;
    lines.push(format!("packet captures:       {}", inv.captures.len()));
    if s.detail {
        for record in &inv.captures {
            lines.push(format!(
                "  {}: {} bytes - {}",
                record.file_name,
                record.size_bytes,
                record.category.as_str()
            ));
        }
        lines.push(format!("capture bytes:         {}", inv.capture_bytes));
    }
    lines.push(format!(
        "store size:            {} bytes ({})",
        inv.store_bytes,
        kib(inv.store_bytes)
    ));
    match inv.ascii_trace_bytes {
        Some(bytes) => lines.push(format!("ascii trace:           {bytes} bytes")),
        None => lines.push("ascii trace:           absent".to_string()),
    }
}

fn performance(lines: &mut Vec<String>, s: &Performance) {
    heading(
        lines,
        &format!("Tracking performance ({})", filter_label(s.filter)),
    );
    let Some(span) = s.span else {
        no_data(lines, "position samples");
        return;
    };
    lines.push(format!(
        "tracking window:       {:.1}s .. {:.1}s",
        span.start_seconds(),
        span.end_seconds()
    ));
    lines.push(format!(
        "tracking duration:     {:.1}s",
        s.completeness.tracking_duration_s
    ));
    lines.push(format!("position records:      {}", s.stats.total_rows));
    lines.push(format!(
        "active nodes:          {} (reference topology: {})",
        s.stats.distinct_nodes, s.reference_nodes
    ));
    lines.push(format!(
        "records per node:      {:.1}",
        s.stats.avg_rows_per_node
    ));
    lines.push(format!(
        "report completeness:   {:.1}%",
        s.completeness.percent
    ));
    lines.push(format!("registration events:   {}", s.registrations));
}

fn summary(lines: &mut Vec<String>, s: &Summary) {
    heading(lines, "Summary");
    lines.push(format!(
        "nodes:                 {} registered, {} active",
        s.total_nodes, s.active_nodes
    ));
    lines.push(format!("registration events:   {}", s.registrations));
    lines.push(format!(
        "packet captures:       {} files, {} bytes",
        s.capture_files, s.capture_bytes
    ));
    lines.push(format!("store size:            {}", kib(s.store_bytes)));
    let topology = match s.topology_all_correct {
        Some(true) => "all positions match",
        Some(false) => "MISMATCH",
        None => "not checked",
    };
    lines.push(format!("topology:              {topology}"));
}
