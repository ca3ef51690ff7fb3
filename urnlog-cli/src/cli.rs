//! CLI argument parsing using clap derive API
//!
//! This module is purely declarative. Positional values are kept as raw strings
//! so that region, round and numeric validation can report domain errors
//! (see [`crate::commands`]) before any file or database is touched.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Configuration file used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "urnlog.toml";

/// Default minimum number of qualifying gaps for `sequences`.
pub const DEFAULT_QUANTITY: &str = "5";

/// urnlog -- voting-machine log ingestion and vote-timing analysis.
///
/// Use `urnlog <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "urnlog", version, about, long_about = None)]
pub struct Cli {
    /// Path to the urnlog.toml configuration file.
    ///
    /// When omitted, `urnlog.toml` is used if present and defaults otherwise.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract `zips/{UF}.zip`, parse every log and load the round's table.
    Process(TargetArgs),

    /// Find closely spaced vote sequences and write a CSV report.
    Sequences(SequencesArgs),

    /// Count gaps between consecutive votes and write a CSV report.
    Frequencies(TargetArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- process / frequencies ----

/// Region and round selecting one table.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Two-letter region code (UF), e.g. SP or ZZ.
    pub uf: String,

    /// Election round (1 or 2).
    pub round: String,
}

// ---- sequences ----

/// Parameters of the sequence search.
#[derive(Args, Debug)]
pub struct SequencesArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Maximum gap in seconds between two votes of one sequence.
    #[arg(allow_negative_numbers = true)]
    pub seconds: String,

    /// Minimum number of qualifying gaps for a sequence to be reported.
    #[arg(default_value = DEFAULT_QUANTITY, allow_negative_numbers = true)]
    pub quantity: String,
}

// ---- config ----

/// Manage urnlog configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, storage, election).
        #[arg(long)]
        section: Option<String>,
    },
}
