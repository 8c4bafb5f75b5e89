//! Logging system setup and configuration
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` takes precedence
//! over the configured level.

use crate::config::LoggingSettings;
use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging system
///
/// Fails if a global subscriber is already installed.
pub fn setup_logging(config: &LoggingSettings) -> Result<()> {
    let log_level = config.level.as_str();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_format {
        registry
            .with(fmt::layer().json().with_target(false))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(false))
            .try_init()?;
    }

    info!("🔧 Logging initialized with level: {}", log_level);
    Ok(())
}
