//! `urnlog sequences` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use urnlog_analysis::{SequenceOutcome, SequenceParams, run_sequences};
use urnlog_core::config::UrnlogConfig;
use urnlog_core::types::TargetTable;

use crate::cli::SequencesArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

use super::{database_path, open_loaded_store, parse_positive, parse_target, task_failed};

/// Validated `sequences` arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencesRequest {
    pub target: TargetTable,
    pub params: SequenceParams,
}

/// Validate region, round, `SECONDS` and `QUANTITY` without touching the disk.
pub fn validate(args: &SequencesArgs) -> Result<SequencesRequest, CliError> {
    let target = parse_target(&args.target)?;
    let max_gap_secs = parse_positive("Segundos", &args.seconds)?;
    let min_gaps = parse_positive("Quantidade", &args.quantity)?;
    let params = SequenceParams::new(max_gap_secs, min_gaps)?;
    Ok(SequencesRequest { target, params })
}

/// Execute the `sequences` command.
pub async fn execute(
    request: SequencesRequest,
    config: &UrnlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let summary = run(request, config).await?;
    writer.render(&summary)?;
    Ok(())
}

/// Stream the vote-chain cursor into `{data_dir}/sequencias/{UF}-{n}t-{T}s-{Q}q.csv`.
pub async fn run(
    request: SequencesRequest,
    config: &UrnlogConfig,
) -> Result<SequencesSummary, CliError> {
    let SequencesRequest { target, params } = request;
    let database = database_path(config);
    let output_dir = config.general.sequences_dir();

    info!(
        table = %target,
        max_gap_secs = params.max_gap_secs,
        min_gaps = params.min_gaps,
        "sequence search started"
    );

    let outcome = tokio::task::spawn_blocking(move || -> Result<SequenceOutcome, CliError> {
        let store = open_loaded_store(&database, &target)?;
        Ok(run_sequences(&store, target, params, &output_dir)?)
    })
    .await
    .map_err(|e| task_failed("sequence", e))??;

    Ok(SequencesSummary {
        region: target.region.code().to_owned(),
        round: target.round.number(),
        max_gap_secs: params.max_gap_secs,
        min_gaps: params.min_gaps,
        path: outcome.path.display().to_string(),
        rows_read: outcome.report.rows_read,
        sequences: outcome.report.sequences,
        rows_written: outcome.report.rows_written,
    })
}

/// Result of one `sequences` run.
#[derive(Debug, Serialize)]
pub struct SequencesSummary {
    pub region: String,
    pub round: u8,
    pub max_gap_secs: u32,
    pub min_gaps: u32,
    /// Report file written
    pub path: String,
    pub rows_read: u64,
    pub sequences: u64,
    pub rows_written: u64,
}

impl Render for SequencesSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Report written: {}", self.path.bold())?;
        writeln!(
            w,
            "  Parameters:       {} round {}, gap <= {}s, at least {} gaps",
            self.region, self.round, self.max_gap_secs, self.min_gaps
        )?;
        writeln!(w, "  Rows analysed:    {}", self.rows_read)?;
        writeln!(w, "  Sequences found:  {}", self.sequences.to_string().green())?;
        writeln!(w, "  Rows written:     {}", self.rows_written)?;
        Ok(())
    }
}
