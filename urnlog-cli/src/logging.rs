//! Logging initialization for the urnlog CLI.
//!
//! Configures `tracing-subscriber` from the `[general]` section of
//! `UrnlogConfig`. The filter comes from, in order:
//!
//! 1. `RUST_LOG`, when set and parseable
//! 2. `--log-level`, already folded into `general.log_level` by the caller
//! 3. `general.log_level` from the config file (or its default)
//!
//! Logs go to stderr so that stdout carries only the command summary.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use urnlog_core::config::GeneralConfig;

/// Output shape of the stderr log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    /// Machine-parseable JSON lines
    Json,
    /// Human-readable multi-line output
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                other
            )),
        }
    }
}

/// Build the level filter, letting `RUST_LOG` override the configured level.
fn build_filter(config: &GeneralConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Initialize the global tracing subscriber.
///
/// Must be called once, before the command runs. The format is checked
/// before anything is installed.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let format = LogFormat::parse(&config.log_format)?;
    let registry = tracing_subscriber::registry().with(build_filter(config));

    let installed = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("failed to initialize {:?} tracing subscriber: {}", format, e))
}
