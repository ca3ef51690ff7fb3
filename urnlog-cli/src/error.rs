//! CLI-specific error types and exit code mapping

use urnlog_analysis::AnalysisError;
use urnlog_core::error::{InputError, StoreError, UrnlogError};
use urnlog_ingest::IngestError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Argument validation failure, reported before any side effect.
    #[error("{0}")]
    Input(#[from] InputError),

    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Archive extraction or load failure.
    #[error("{0}")]
    Ingest(#[from] IngestError),

    /// Analysis or report output failure.
    #[error("{0}")]
    Analysis(#[from] AnalysisError),

    /// Database failure outside a pipeline run.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UrnlogError> for CliError {
    fn from(e: UrnlogError) -> Self {
        match e {
            UrnlogError::Config(e) => Self::Config(e.to_string()),
            UrnlogError::Input(e) => Self::Input(e),
            UrnlogError::Store(e) => Self::Store(e),
            UrnlogError::Io(e) => Self::Io(e),
            other => Self::Command(other.to_string()),
        }
    }
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                      |
    /// |------|----------------------------------------------|
    /// | 0    | Success                                      |
    /// | 1    | Command failure (store, analysis, output)    |
    /// | 2    | Invalid input, including an unreadable archive |
    /// | 3    | Configuration error                          |
    /// | 10   | IO error                                     |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Input(_) | Self::Ingest(IngestError::RootArchive { .. }) => 2,
            Self::Config(_) => 3,
            Self::Io(_) => 10,
            Self::Ingest(_)
            | Self::Analysis(_)
            | Self::Store(_)
            | Self::JsonSerialize(_)
            | Self::Command(_) => 1,
        }
    }
}
