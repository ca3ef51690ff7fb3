//! `urnlog process` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use urnlog_core::config::UrnlogConfig;
use urnlog_core::types::TargetTable;
use urnlog_ingest::{IngestConfig, LoadReport, TracingDiagnostics, run_ingest};
use urnlog_store::SqliteStore;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

use super::{database_path, task_failed};

/// Execute the `process` command.
pub async fn execute(
    target: TargetTable,
    config: &UrnlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let summary = run(target, config).await?;
    writer.render(&summary)?;
    Ok(())
}

/// Extract `{data_dir}/zips/{UF}.zip`, parse every raw log and reload the
/// round's table.
///
/// The archive walk, parsing and SQLite writes are blocking work and run on
/// the blocking thread pool. The database is only opened once the root
/// archive has been recognised.
pub async fn run(target: TargetTable, config: &UrnlogConfig) -> Result<ProcessSummary, CliError> {
    let archive = config.general.archive_path(target.region);
    let scratch = config.general.scratch_dir(target.region);
    let database = database_path(config);
    let ingest_config = IngestConfig::from_core(config, target.round);

    info!(
        table = %target,
        archive = %archive.display(),
        database = %database.display(),
        round_date = %ingest_config.round_date,
        "processing started"
    );

    let summary = tokio::task::spawn_blocking(move || -> Result<ProcessSummary, CliError> {
        let report = run_ingest(
            &archive,
            &scratch,
            target,
            &ingest_config,
            || SqliteStore::open(&database),
            TracingDiagnostics::new(),
        )?;
        Ok(ProcessSummary::new(
            target,
            archive.display().to_string(),
            database.display().to_string(),
            report,
        ))
    })
    .await
    .map_err(|e| task_failed("ingest", e))??;

    info!(table = %summary.table, rows = summary.rows, "processing finished");
    Ok(summary)
}

/// Result of one `process` run.
#[derive(Debug, Serialize)]
pub struct ProcessSummary {
    pub region: String,
    pub round: u8,
    pub table: String,
    pub archive: String,
    pub database: String,
    /// Raw log files parsed
    pub files: u64,
    /// Rows inserted into the table
    pub rows: u64,
    /// Lines dropped on decode or parse failure
    pub rejected_lines: u64,
    /// Lines dated outside the round's election day
    pub filtered_lines: u64,
    pub containers_opened: u64,
    pub containers_skipped: u64,
    pub entries_ignored: u64,
}

impl ProcessSummary {
    fn new(target: TargetTable, archive: String, database: String, report: LoadReport) -> Self {
        Self {
            region: target.region.code().to_owned(),
            round: target.round.number(),
            table: target.table_name(),
            archive,
            database,
            files: report.files,
            rows: report.rows,
            rejected_lines: report.rejected_lines,
            filtered_lines: report.filtered_lines,
            containers_opened: report.walk.containers_opened,
            containers_skipped: report.walk.containers_skipped,
            entries_ignored: report.walk.entries_ignored,
        }
    }
}

impl Render for ProcessSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Processed {} round {} into {}",
            self.region.bold(),
            self.round,
            self.table.bold()
        )?;
        writeln!(w, "  Archive:            {}", self.archive)?;
        writeln!(w, "  Database:           {}", self.database)?;
        writeln!(w, "  Log files:          {}", self.files)?;
        writeln!(w, "  Rows loaded:        {}", self.rows.to_string().green())?;
        writeln!(w, "  Other-day lines:    {}", self.filtered_lines)?;

        let rejected = self.rejected_lines.to_string();
        if self.rejected_lines > 0 {
            writeln!(w, "  Rejected lines:     {}", rejected.yellow())?;
        } else {
            writeln!(w, "  Rejected lines:     {}", rejected)?;
        }

        let skipped = self.containers_skipped.to_string();
        writeln!(
            w,
            "  Containers:         {} opened, {} skipped",
            self.containers_opened,
            if self.containers_skipped > 0 {
                skipped.yellow()
            } else {
                skipped.normal()
            }
        )?;
        writeln!(w, "  Ignored entries:    {}", self.entries_ignored)?;
        Ok(())
    }
}
