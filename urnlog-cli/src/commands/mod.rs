//! Command handlers -- one module per subcommand
//!
//! Raw arguments become a [`Request`] before anything touches the disk, so an
//! invalid region, round or number aborts with exit code 2 and no side effects.

use std::path::{Path, PathBuf};

use urnlog_core::config::UrnlogConfig;
use urnlog_core::error::InputError;
use urnlog_core::types::{Region, Round, TargetTable};
use urnlog_store::SqliteStore;

use crate::cli::{Commands, ConfigArgs, DEFAULT_CONFIG_PATH, TargetArgs};
use crate::error::CliError;
use crate::output::OutputWriter;

pub mod config;
pub mod frequencies;
pub mod process;
pub mod sequences;

/// A validated command.
#[derive(Debug)]
pub enum Request {
    Process(TargetTable),
    Sequences(sequences::SequencesRequest),
    Frequencies(TargetTable),
    Config(ConfigArgs),
}

impl Request {
    /// Validate the raw subcommand arguments.
    pub fn from_command(command: Commands) -> Result<Self, CliError> {
        Ok(match command {
            Commands::Process(args) => Self::Process(parse_target(&args)?),
            Commands::Sequences(args) => Self::Sequences(sequences::validate(&args)?),
            Commands::Frequencies(args) => Self::Frequencies(parse_target(&args)?),
            Commands::Config(args) => Self::Config(args),
        })
    }

    /// `config` reads the file itself so that it can report load errors.
    pub fn loads_config(&self) -> bool {
        !matches!(self, Self::Config(_))
    }

    /// Run the command and render its summary.
    pub async fn execute(
        self,
        config_path: Option<&Path>,
        config: &UrnlogConfig,
        writer: &OutputWriter,
    ) -> Result<(), CliError> {
        match self {
            Self::Process(target) => process::execute(target, config, writer).await,
            Self::Sequences(request) => sequences::execute(request, config, writer).await,
            Self::Frequencies(target) => frequencies::execute(target, config, writer).await,
            Self::Config(args) => self::config::execute(args, config_path, writer).await,
        }
    }
}

/// Parse the region code and round number of a target table.
pub fn parse_target(args: &TargetArgs) -> Result<TargetTable, InputError> {
    let region: Region = args.uf.parse()?;
    let round: Round = args.round.parse()?;
    Ok(TargetTable::new(region, round))
}

/// Parse an integer that must be at least one.
pub fn parse_positive(field: &str, value: &str) -> Result<u32, InputError> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|v| *v >= 1)
        .ok_or_else(|| InputError::NotPositive {
            field: field.to_owned(),
            value: value.to_owned(),
        })
}

/// Load the effective configuration.
///
/// An explicit `--config` path must exist. Without it, `urnlog.toml` is read
/// when present and defaults are used otherwise. `--log-level` wins over the file.
pub async fn load_config(
    path: Option<&Path>,
    log_level: Option<&str>,
) -> Result<UrnlogConfig, CliError> {
    let mut config = match path {
        Some(path) => UrnlogConfig::load(path).await?,
        None => UrnlogConfig::load_or_default(DEFAULT_CONFIG_PATH).await?,
    };

    if let Some(level) = log_level {
        config.general.log_level = level.to_owned();
        config.validate()?;
    }

    Ok(config)
}

/// Open the database for analysis, refusing to create it or to query a table
/// that `process` never loaded.
fn open_loaded_store(database: &Path, target: &TargetTable) -> Result<SqliteStore, CliError> {
    if !database.exists() {
        return Err(CliError::Command(format!(
            "database {} not found; run `urnlog process {} {}` first",
            database.display(),
            target.region,
            target.round
        )));
    }

    let store = SqliteStore::open(database)?;
    if !store.table_exists(target)? {
        return Err(CliError::Command(format!(
            "table {} not found in {}; run `urnlog process {} {}` first",
            target.table_name(),
            database.display(),
            target.region,
            target.round
        )));
    }
    Ok(store)
}

fn database_path(config: &UrnlogConfig) -> PathBuf {
    PathBuf::from(&config.storage.database_path)
}

fn task_failed(stage: &str, e: tokio::task::JoinError) -> CliError {
    CliError::Command(format!("{stage} task failed: {e}"))
}
