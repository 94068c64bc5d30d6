#![forbid(unsafe_code)]

use super::*;
use crate::analysis::SectionReport;
use ot_core::artifacts::ArtifactCategory;
use ot_core::model::NodeRole;
use ot_core::topology::ReferenceTopology;
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};

const SECOND_NS: i64 = 1_000_000_000;
const REGISTRATIONS: i64 = 944;
const TRACKED_SECONDS: i64 = 97;

fn create_schema(path: &Path) -> Connection {
    let conn = Connection::open(path).expect("fixture db must open");
    conn.execute_batch(
        "CREATE TABLE node(nodeid INTEGER PRIMARY KEY);
         CREATE TABLE nodelocation(
             entryid INTEGER PRIMARY KEY AUTOINCREMENT,
             nodeid INTEGER NOT NULL,
             x REAL NOT NULL, y REAL NOT NULL, z REAL NOT NULL,
             simulationtime INTEGER NOT NULL
         );
         CREATE TABLE noderegistration(nodeid INTEGER NOT NULL, simulationtime INTEGER NOT NULL);",
    )
    .expect("fixture schema");
    conn
}

/// Eight nodes parked on the reference grid, one position sample per second
/// for 0..=97 s, and 944 registrations spread evenly over the same window.
fn reference_run(dir: &Path) -> PathBuf {
    let path = dir.join(ot_storage::DEFAULT_STORE_FILE_NAME);
    let conn = create_schema(&path);
    let topology = ReferenceTopology::oran_grid();

    for node_id in topology.node_ids() {
        conn.execute("INSERT INTO node(nodeid) VALUES (?1)", params![node_id])
            .expect("insert node");
    }
    for second in 0..=TRACKED_SECONDS {
        for node_id in topology.node_ids() {
            let p = topology.expected(node_id).expect("reference node");
            conn.execute(
                "INSERT INTO nodelocation(nodeid, x, y, z, simulationtime) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![node_id, p.x, p.y, p.z, second * SECOND_NS],
            )
            .expect("insert location");
        }
    }
    for i in 0..REGISTRATIONS {
        let node_id = i % 8 + 1;
        let t = i * TRACKED_SECONDS * SECOND_NS / (REGISTRATIONS - 1);
        conn.execute(
            "INSERT INTO noderegistration(nodeid, simulationtime) VALUES (?1, ?2)",
            params![node_id, t],
        )
        .expect("insert registration");
    }
    drop(conn);

    std::fs::write(dir.join("oran-forwarding-backbone-0-1.pcap"), [0u8; 240]).expect("pcap");
    std::fs::write(dir.join("oran-forwarding-cluster1-1-0.pcap"), [0u8; 120]).expect("pcap");
    path
}

fn config_for(args: &[&str], db: &Path, work_dir: &Path) -> AnalyzerConfig {
    let mut argv = vec!["oran-telemetry"];
    argv.extend_from_slice(args);
    let db = db.to_str().expect("utf-8 path");
    let work_dir = work_dir.to_str().expect("utf-8 path");
    argv.extend_from_slice(&["--db", db, "--work-dir", work_dir]);
    let cli = Cli::try_parse_from(argv).expect("cli parses");
    AnalyzerConfig::from_cli(cli).expect("config")
}

fn section<'a, T>(
    report: &'a AnalysisReport,
    pick: impl Fn(&'a SectionReport) -> Option<&'a T>,
) -> &'a T {
    report
        .sections
        .iter()
        .find_map(pick)
        .expect("section present in report")
}

#[test]
fn full_analysis_of_reference_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = reference_run(dir.path());
    let report = analyze(&config_for(&["full"], &db, dir.path())).expect("analysis");

    let overview = section(&report, |s| match s {
        SectionReport::Overview(o) => Some(o),
        _ => None,
    });
    assert_eq!(overview.total_nodes, 8);
    assert_eq!(overview.located_nodes, 8);
    assert_eq!(overview.registrations, 944);
    assert_eq!(overview.location_rows, 8 * 98);

    let summary = section(&report, |s| match s {
        SectionReport::Summary(o) => Some(o),
        _ => None,
    });
    assert_eq!(summary.active_nodes, 8);
    assert_eq!(summary.capture_files, 2);
    assert_eq!(summary.capture_bytes, 360);
    assert_eq!(summary.topology_all_correct, Some(true));
    assert_eq!(report.topology_verdict(), Some(true));

    let timeline = section(&report, |s| match s {
        SectionReport::Timeline(t) => Some(t),
        _ => None,
    });
    assert_eq!(timeline.summary.count, 944);
    assert_eq!(timeline.summary.first_ns, Some(0));
    assert_eq!(timeline.summary.last_ns, Some(97 * SECOND_NS));
    // Eleven windows (0 s .. 100 s) exist; the preview keeps the first ten.
    assert_eq!(timeline.buckets.len(), 10);
    assert!(timeline.truncated);
    assert_eq!(timeline.buckets[9].window_s, 90.0);
    assert_eq!(
        timeline.buckets.iter().map(|b| b.registrations).sum::<u64>(),
        944 - 20
    );

    let perf = section(&report, |s| match s {
        SectionReport::Performance(p) => Some(p),
        _ => None,
    });
    assert_eq!(perf.completeness.tracking_duration_s, 97.0);
    assert!(perf.completeness.percent.is_finite());
    let expected = 784.0 / (8.0 * 97.0) * 100.0;
    assert!((perf.completeness.percent - expected).abs() < 1e-9);
    assert_eq!(perf.stats.avg_rows_per_node, 98.0);

    let positions = section(&report, |s| match s {
        SectionReport::Positions(p) => Some(p),
        _ => None,
    });
    assert_eq!(positions.rows.len(), 8);
    assert!(!positions.truncated);
    assert_eq!(positions.rows[3].role, NodeRole::OCuCluster1);
    assert_eq!(positions.rows[7].role, NodeRole::OCuCluster2);

    let artifacts = section(&report, |s| match s {
        SectionReport::Artifacts(a) => Some(a),
        _ => None,
    });
    assert_eq!(
        artifacts.inventory.captures[0].category,
        ArtifactCategory::BackboneLink
    );
    assert_eq!(artifacts.inventory.ascii_trace_bytes, None);

    let text = render::render_text(&report);
    assert!(text.contains("all positions match the reference topology"));
    assert!(text.contains("report completeness:   101.0%"));
}

#[test]
fn repeated_runs_render_identical_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = reference_run(dir.path());

    for mode in ["full", "detailed", "quick", "validate"] {
        let config = config_for(&[mode], &db, dir.path());
        let first = analyze(&config).expect("first run");
        let second = analyze(&config).expect("second run");
        assert_eq!(first, second, "{mode}");
        assert_eq!(render::render_text(&first), render::render_text(&second));
        assert_eq!(
            render::render_json(&first).expect("json"),
            render::render_json(&second).expect("json")
        );
    }
}

#[test]
fn detailed_mode_restricts_to_reference_nodes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = reference_run(dir.path());
    let conn = Connection::open(&db).expect("reopen fixture");
    conn.execute("INSERT INTO node(nodeid) VALUES (9)", [])
        .expect("extra node");
    conn.execute(
        "INSERT INTO nodelocation(nodeid, x, y, z, simulationtime) VALUES (9, 0, 0, 500, 0)",
        [],
    )
    .expect("extra location");
    conn.execute(
        "INSERT INTO noderegistration(nodeid, simulationtime) VALUES (9, 0)",
        [],
    )
    .expect("extra registration");
    drop(conn);

    let report = analyze(&config_for(&["detailed"], &db, dir.path())).expect("analysis");
    let regs = section(&report, |s| match s {
        SectionReport::RegistrationsByNode(r) => Some(r),
        _ => None,
    });
    assert_eq!(regs.rows.len(), 8);
    assert_eq!(regs.rows.iter().map(|r| r.registrations).sum::<u64>(), 944);

    let tracking = section(&report, |s| match s {
        SectionReport::Tracking(t) => Some(t),
        _ => None,
    });
    assert!(tracking.show_mean);
    assert_eq!(tracking.rows.len(), 8);
    assert_eq!(tracking.rows[0].mean_s, 48.5);

    let grid = section(&report, |s| match s {
        SectionReport::Grid(g) => Some(g),
        _ => None,
    });
    assert_eq!(grid.rows.len(), 8);
    assert_eq!(grid.rows[0].placement.label(), "cluster-1/upper");
    assert_eq!(grid.rows[6].placement.label(), "cluster-2/lower");

    let summary = section(&report, |s| match s {
        SectionReport::Summary(o) => Some(o),
        _ => None,
    });
    assert_eq!(summary.total_nodes, 9);
    assert_eq!(summary.active_nodes, 8);
}

#[test]
fn validate_mode_flags_a_node_that_ever_strayed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = reference_run(dir.path());
    let conn = Connection::open(&db).expect("reopen fixture");
    // An early off-grid sample; the latest sample (highest entryid) is still on grid.
    conn.execute(
        "INSERT INTO nodelocation(entryid, nodeid, x, y, z, simulationtime) \
         VALUES (0, 3, -151.0, 50.0, 100.0, 0)",
        [],
    )
    .expect("stray sample");
    drop(conn);

    let full = analyze(&config_for(&["full"], &db, dir.path())).expect("full");
    assert_eq!(full.topology_verdict(), Some(true));

    let strict = analyze(&config_for(&["validate"], &db, dir.path())).expect("validate");
    assert_eq!(strict.topology_verdict(), Some(false));
    assert_eq!(strict.sections.len(), 1);
    let check = section(&strict, |s| match s {
        SectionReport::Topology(t) => Some(t),
        _ => None,
    });
    assert_eq!(check.report.mismatched, 1);
    assert_eq!(check.report.matched, 8);
    assert!(render::render_text(&strict).contains("MISMATCH"));
}

#[test]
fn quick_mode_skips_artifact_detail() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = reference_run(dir.path());
    let report = analyze(&config_for(&["quick", "--limit", "3"], &db, dir.path())).expect("quick");
    assert_eq!(report.sections.len(), 4);
    let positions = section(&report, |s| match s {
        SectionReport::Positions(p) => Some(p),
        _ => None,
    });
    assert_eq!(positions.rows.len(), 3);

    let text = render::render_text(&report);
    assert!(text.contains("packet captures:       2"));
    assert!(!text.contains("oran-forwarding-backbone-0-1.pcap"));
    assert!(text.contains("(showing first 3 rows)"));
}

#[test]
fn empty_store_reports_no_data_and_zero_ratios() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join(ot_storage::DEFAULT_STORE_FILE_NAME);
    drop(create_schema(&db));

    let report = analyze(&config_for(&["full"], &db, dir.path())).expect("analysis");
    let perf = section(&report, |s| match s {
        SectionReport::Performance(p) => Some(p),
        _ => None,
    });
    assert_eq!(perf.completeness.percent, 0.0);
    assert_eq!(perf.stats.avg_rows_per_node, 0.0);

    let text = render::render_text(&report);
    assert!(text.contains("no registration records"));
    assert!(text.contains("(no position data)"));
    assert!(text.contains("(no position samples)"));
}

#[test]
fn missing_store_aborts_before_any_query() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = analyze(&config_for(&["full"], &dir.path().join("absent.db"), dir.path()))
        .expect_err("no store anywhere");
    assert_eq!(err.code(), "STORE_NOT_FOUND");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn store_without_tables_is_unreadable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join(ot_storage::DEFAULT_STORE_FILE_NAME);
    let conn = Connection::open(&db).expect("db");
    conn.execute_batch("CREATE TABLE unrelated(id INTEGER);")
        .expect("schema");
    drop(conn);

    let err = analyze(&config_for(&["quick"], &db, dir.path())).expect_err("unreadable");
    assert_eq!(err.code(), "STORE_UNREADABLE");
}

#[test]
fn table_filling_its_cap_exactly_is_not_marked_truncated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = reference_run(dir.path());
    let report = analyze(&config_for(&["quick"], &db, dir.path())).expect("quick");
    let positions = section(&report, |s| match s {
        SectionReport::Positions(p) => Some(p),
        _ => None,
    });
    assert_eq!(positions.limit, Some(8));
    assert_eq!(positions.rows.len(), 8);
    assert!(!positions.truncated);
    assert!(!render::render_text(&report).contains("(showing first"));
}

#[test]
fn performance_stats_follow_per_node_reports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = reference_run(dir.path());
    let conn = Connection::open(&db).expect("reopen fixture");
    for second in 0..5 {
        conn.execute(
            "INSERT INTO nodelocation(nodeid, x, y, z, simulationtime) \
             VALUES (2, -250.0, 50.0, 100.0, ?1)",
            params![second * SECOND_NS + SECOND_NS / 2],
        )
        .expect("extra sample");
    }
    drop(conn);

    let report = analyze(&config_for(&["full"], &db, dir.path())).expect("analysis");
    let perf = section(&report, |s| match s {
        SectionReport::Performance(p) => Some(p),
        _ => None,
    });

    let store = ot_storage::TelemetryStore::open(&db).expect("open");
    let totals = store.location_totals(ot_storage::NodeFilter::All).expect("totals");
    let mut per_node = store
        .location_summary_by_node(ot_storage::NodeFilter::All, None)
        .expect("per node")
        .iter()
        .map(|row| (row.node_id, row.reports))
        .collect::<Vec<_>>();
    per_node.reverse();
    store.close().expect("close");

    assert_eq!(perf.stats.total_rows, totals.total_rows);
    assert_eq!(perf.stats.total_rows, 8 * 98 + 5);
    assert_eq!(perf.stats.distinct_nodes, 8);
    assert_eq!(perf.stats, ot_core::metrics::LocationStats::from_rows(&per_node));
    assert_eq!(perf.completeness.observed_positions, 8 * 98 + 5);
}
