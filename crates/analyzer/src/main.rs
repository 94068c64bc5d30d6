#![forbid(unsafe_code)]

mod analysis;
mod config;
mod error;
mod plan;
mod render;
mod scan;

use analysis::{AnalysisReport, run_analysis};
use clap::Parser;
use config::{AnalyzerConfig, Cli, OutputFormat, Verbosity};
use error::AnalyzerError;
use plan::{ModePlan, RunMode};
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_TOPOLOGY_MISMATCH: u8 = 3;

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directives()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Opens the store, runs the plan and releases the connection on every path.
fn analyze(config: &AnalyzerConfig) -> Result<AnalysisReport, AnalyzerError> {
    let store = ot_storage::TelemetryStore::open_located(&config.locator, &config.store_candidate)?;

    let mut plan = ModePlan::for_mode(config.mode, &config.topology);
    if let Some(row_limit) = config.row_limit_override {
        plan = plan.with_row_limit(row_limit);
    }

    let result = run_analysis(&store, &plan, &config.topology, &config.work_dir);
    let closed = store.close();
    let report = result?;
    closed?;
    Ok(report)
}

fn render(report: &AnalysisReport, format: OutputFormat) -> Result<String, AnalyzerError> {
    match format {
        OutputFormat::Text => Ok(render::render_text(report)),
        OutputFormat::Json => render::render_json(report),
    }
}

fn run(config: &AnalyzerConfig) -> Result<ExitCode, AnalyzerError> {
    let report = analyze(config)?;
    let text = render(&report, config.format)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| AnalyzerError::io("writing report", err))?;

    if config.mode == RunMode::Validate && report.topology_verdict() == Some(false) {
        return Ok(ExitCode::from(EXIT_TOPOLOGY_MISMATCH));
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbosity());

    let outcome = AnalyzerConfig::from_cli(cli).and_then(|config| run(&config));
    match outcome {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(code = err.code(), error = %err, "analysis aborted");
            eprintln!("error [{}]: {err}", err.code());
            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests;
