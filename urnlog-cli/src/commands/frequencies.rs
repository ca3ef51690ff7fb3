//! `urnlog frequencies` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use urnlog_analysis::{FrequencyOutcome, run_frequencies};
use urnlog_core::config::UrnlogConfig;
use urnlog_core::types::TargetTable;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

use super::{database_path, open_loaded_store, task_failed};

/// Execute the `frequencies` command.
pub async fn execute(
    target: TargetTable,
    config: &UrnlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let summary = run(target, config).await?;
    writer.render(&summary)?;
    Ok(())
}

/// Aggregate gap frequencies into `{data_dir}/frequencias/{UF}-{n}t.csv`.
pub async fn run(target: TargetTable, config: &UrnlogConfig) -> Result<FrequenciesSummary, CliError> {
    let database = database_path(config);
    let output_dir = config.general.frequencies_dir();

    info!(table = %target, "frequency count started");

    let outcome = tokio::task::spawn_blocking(move || -> Result<FrequencyOutcome, CliError> {
        let store = open_loaded_store(&database, &target)?;
        Ok(run_frequencies(&store, target, &output_dir)?)
    })
    .await
    .map_err(|e| task_failed("frequency", e))??;

    Ok(FrequenciesSummary {
        region: target.region.code().to_owned(),
        round: target.round.number(),
        path: outcome.path.display().to_string(),
        buckets: outcome.report.buckets,
        events: outcome.report.events,
    })
}

/// Result of one `frequencies` run.
#[derive(Debug, Serialize)]
pub struct FrequenciesSummary {
    pub region: String,
    pub round: u8,
    /// Report file written
    pub path: String,
    /// Distinct gap values
    pub buckets: u64,
    /// Confirmed votes counted
    pub events: u64,
}

impl Render for FrequenciesSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Report written: {}", self.path.bold())?;
        writeln!(w, "  Target:           {} round {}", self.region, self.round)?;
        writeln!(w, "  Distinct gaps:    {}", self.buckets)?;
        writeln!(w, "  Votes counted:    {}", self.events)?;
        Ok(())
    }
}
