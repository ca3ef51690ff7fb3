//! urnlog CLI -- argument parsing, command handlers and output rendering.
//!
//! The `urnlog` binary is a thin wrapper around [`run`].

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

use urnlog_core::config::UrnlogConfig;

use crate::cli::Cli;
use crate::commands::Request;
use crate::error::CliError;
use crate::output::OutputWriter;

/// Validate the arguments, load configuration, initialize logging and run
/// the selected command.
///
/// Argument validation happens first, so invalid input never opens a file.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        config: config_path,
        log_level,
        output,
        command,
    } = cli;
    let writer = OutputWriter::new(output);

    let request = Request::from_command(command)?;

    let config = if request.loads_config() {
        commands::load_config(config_path.as_deref(), log_level.as_deref()).await?
    } else {
        let mut config = UrnlogConfig::default();
        if let Some(level) = log_level {
            config.general.log_level = level;
        }
        config
    };

    logging::init_tracing(&config.general)
        .map_err(|e| CliError::Config(format!("{e:#}")))?;
    urnlog_core::metrics::describe_all();

    request
        .execute(config_path.as_deref(), &config, &writer)
        .await
}
