//! Logging initialization for the CLI

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize console logging
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks between debug and
/// info as the default level.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!(verbose, "Logging initialized");
    Ok(())
}
