//! Main application entry point for the spatial probe
//!
//! Loads configuration, sets up logging, runs the synthetic workload against
//! one spatial index per level and prints the final statistics as JSON.

mod cli;
mod config;
mod logging;
mod workload;

use cli::CliArgs;
use config::AppConfig;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let mut config = AppConfig::load_from_file(&args.config_path)?;
    config.apply_overrides(&args);
    config.validate()?;

    logging::setup_logging(&config.logging)?;

    info!("🚀 Starting spatial probe");
    info!("📂 Config: {}", args.config_path.display());
    info!(
        "🌍 World: {:?}, levels: {:?}",
        config.index.world.to_bounds(),
        config.workload.levels
    );

    let report = match workload::run(&config) {
        Ok(report) => report,
        Err(e) => {
            error!("❌ Workload failed: {}", e);
            return Err(e.into());
        }
    };

    info!("✅ Workload finished after {} ticks", report.ticks);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
