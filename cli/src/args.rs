use std::path::PathBuf;

use casetree::GroupingMode;
use clap::Parser;
use tracing::Level;

/// Prints the browsing tree of a case, expanding nodes the way a viewer
/// would.
#[derive(Parser, Clone, Debug)]
pub struct Args {
    /// A global log level to use when printing logs.
    /// It's also possible to set `RUST_LOG` according to
    /// `tracing_subscriber::filter::EnvFilter`, which will always have
    /// priority.
    #[arg(long, default_value_t=Level::INFO)]
    pub log_level: Level,

    /// Print logs as JSON.
    #[arg(long)]
    pub json_logs: bool,

    /// Where the case is stored, e.g. `json:///cases/demo/case.json`.
    #[arg(long, env = "CASETREE_CASE_ADDR", default_value = "memory://")]
    pub case_addr: String,

    /// A TOML file with tree preferences.
    #[arg(long, env = "CASETREE_CONFIG")]
    pub config: Option<PathBuf>,

    /// How the top level is organized, overriding the preferences.
    /// One of `by_data_type`, `by_person_host`.
    #[arg(long)]
    pub grouping: Option<GroupingMode>,

    /// How many levels below the root to expand.
    #[arg(long, default_value_t = 3)]
    pub depth: usize,
}
