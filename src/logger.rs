//! Logging support.
//!
//! Replaces the teacher's Datadog/`flexi_logger` fleet-telemetry stack: this
//! is a headless library with no telemetry backend to report to, so a
//! plain `tracing-subscriber` layer plus `color-eyre` is all that's kept.

use eyre::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_LOG_LEVEL: &str = "info";

/// Installs the global `tracing` subscriber and `color-eyre`'s panic/error
/// report hooks.
///
/// # Errors
///
/// Returns an error if either installer has already run, or if the
/// `RUST_LOG` filter is malformed.
pub fn init() -> Result<()> {
    color_eyre::install()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).with_target(true).finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| eyre::eyre!("failed to install global tracing subscriber: {err}"))?;
    Ok(())
}
