#![forbid(unsafe_code)]

use crate::error::AnalyzerError;
use crate::plan::RunMode;
use clap::{Parser, Subcommand, ValueEnum};
use ot_core::topology::ReferenceTopology;
use ot_storage::{DEFAULT_STORE_FILE_NAME, StoreLocator};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "oran-telemetry")]
#[command(about = "Validate and summarize O-RAN forwarding simulation telemetry", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Telemetry database; searched for next to the binary and below the work dir when absent
    #[arg(long, global = true, env = "OT_DB_PATH", default_value = DEFAULT_STORE_FILE_NAME)]
    pub db: PathBuf,

    /// Directory holding the trace captures (defaults to the current directory)
    #[arg(long, global = true, env = "OT_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// JSON file with the expected node placement
    #[arg(long, global = true, env = "OT_TOPOLOGY")]
    pub topology: Option<PathBuf>,

    /// Report format
    #[arg(long, global = true, env = "OT_FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Row cap for every table (0 disables the cap)
    #[arg(long, global = true, env = "OT_ROW_LIMIT")]
    pub limit: Option<usize>,

    /// Debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Warnings and errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Every section, all nodes
    Full,
    /// Per-node breakdown of the reference nodes
    Detailed,
    /// Headline counts only
    Quick,
    /// Strict check of every reported position against the reference topology
    Validate,
}

impl From<Command> for RunMode {
    fn from(command: Command) -> Self {
        match command {
            Command::Full => RunMode::Full,
            Command::Detailed => RunMode::Detailed,
            Command::Quick => RunMode::Quick,
            Command::Validate => RunMode::Validate,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn default_directives(self) -> &'static str {
        match self {
            Verbosity::Quiet => "ot_analyzer=warn,ot_storage=warn",
            Verbosity::Normal => "ot_analyzer=info,ot_storage=info",
            Verbosity::Verbose => "ot_analyzer=debug,ot_storage=debug",
        }
    }
}

#[derive(Debug)]
pub struct AnalyzerConfig {
    pub mode: RunMode,
    pub store_candidate: PathBuf,
    pub locator: StoreLocator,
    pub work_dir: PathBuf,
    pub topology: ReferenceTopology,
    pub format: OutputFormat,
    pub row_limit_override: Option<Option<usize>>,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.verbose {
            Verbosity::Verbose
        } else if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }
}

impl AnalyzerConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, AnalyzerError> {
        let work_dir = match cli.work_dir {
            Some(dir) => dir,
            None => std::env::current_dir()
                .map_err(|err| AnalyzerError::io("current directory", err))?,
        };
        let topology = match cli.topology.as_deref() {
            Some(path) => load_topology(path)?,
            None => ReferenceTopology::oran_grid(),
        };

        Ok(Self {
            mode: cli.command.map(RunMode::from).unwrap_or(RunMode::Full),
            store_candidate: cli.db,
            locator: StoreLocator::default_for(&work_dir),
            work_dir,
            topology,
            format: cli.format,
            // `--limit 0` lifts the cap entirely.
            row_limit_override: cli.limit.map(|limit| (limit > 0).then_some(limit)),
        })
    }
}

pub fn load_topology(path: &Path) -> Result<ReferenceTopology, AnalyzerError> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| AnalyzerError::io(format!("topology {}", path.display()), err))?;
    ReferenceTopology::from_json(&text).map_err(|source| AnalyzerError::Topology {
        path: path.to_path_buf(),
        source,
    })
}
