//! Configuration management for the spatial probe.
//!
//! Loads the probe's TOML configuration and applies command-line overrides.

use crate::cli::CliArgs;
use serde::{Deserialize, Serialize};
use spatial_index::{ConfigError, IndexConfig};
use std::path::Path;
use tracing::info;

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Settings shared by every level's index
    #[serde(default)]
    pub index: IndexConfig,
    /// Synthetic workload shape
    #[serde(default)]
    pub workload: WorkloadSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Shape of the simulated workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSettings {
    /// Levels loaded side by side, each with its own index
    pub levels: Vec<String>,
    /// Objects spawned per level before the first tick
    pub object_count: usize,
    /// Number of simulated ticks
    pub ticks: u32,
    /// Radius of the per-tick proximity queries
    pub query_radius: f64,
    /// Maximum distance an entity moves in one tick
    pub move_step: f64,
    /// Fraction of projectiles despawned (and respawned) per tick
    pub despawn_ratio: f64,
    /// Seed for the workload RNG
    pub seed: u64,
}

impl Default for WorkloadSettings {
    fn default() -> Self {
        Self {
            levels: vec!["overworld".to_string()],
            object_count: 2_000,
            ticks: 60,
            query_radius: 150.0,
            move_step: 25.0,
            despawn_ratio: 0.1,
            seed: 42,
        }
    }
}

/// Logging system configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            workload: WorkloadSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at
    /// the specified path and returns the default configuration.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
            Ok(toml::from_str(&content)?)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            std::fs::write(path, toml_content)
                .map_err(|e| ConfigError::Write(path.to_path_buf(), e))?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Applies command-line overrides on top of the file values
    pub fn apply_overrides(&mut self, args: &CliArgs) {
        if let Some(objects) = args.objects {
            self.workload.object_count = objects;
        }
        if let Some(ticks) = args.ticks {
            self.workload.ticks = ticks;
        }
        if let Some(seed) = args.seed {
            self.workload.seed = seed;
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if args.json_logs {
            self.logging.json_format = true;
        }
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.index.validate()?;

        if self.workload.levels.is_empty() {
            return Err(ConfigError::Invalid("at least one level is required".to_string()));
        }
        let radius = self.workload.query_radius;
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "query_radius must be finite and not negative, got {radius}"
            )));
        }
        let step = self.workload.move_step;
        if !(step.is_finite() && step >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "move_step must be finite and not negative, got {step}"
            )));
        }
        if !(0.0..=1.0).contains(&self.workload.despawn_ratio) {
            return Err(ConfigError::Invalid(format!(
                "despawn_ratio must be within 0..=1, got {}",
                self.workload.despawn_ratio
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.workload.levels, vec!["overworld".to_string()]);
        assert_eq!(config.workload.object_count, 2_000);
        assert_eq!(config.workload.ticks, 60);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert_eq!(config.index, IndexConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_nonexistent_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("probe.toml");

        let config = AppConfig::load_from_file(&path).unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_load_from_existing_file() {
        let toml_content = r#"
[index]
max_objects_per_node = 6
max_depth = 5

[index.world]
x = 0.0
y = 0.0
width = 2048.0
height = 1024.0

[workload]
levels = ["town", "sewers"]
object_count = 300
ticks = 5
query_radius = 40.0
move_step = 3.0
despawn_ratio = 0.25
seed = 9

[logging]
level = "debug"
json_format = true
"#;

        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), toml_content).unwrap();

        let config = AppConfig::load_from_file(temp_file.path()).unwrap();

        assert_eq!(config.index.max_objects_per_node, 6);
        assert_eq!(config.index.max_depth, 5);
        assert_eq!(config.index.world.width, 2048.0);
        assert_eq!(config.workload.levels, vec!["town".to_string(), "sewers".to_string()]);
        assert_eq!(config.workload.object_count, 300);
        assert_eq!(config.workload.despawn_ratio, 0.25);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        let content = "[logging]\nlevel = \"warn\"\njson_format = false\n";
        std::fs::write(temp_file.path(), content).unwrap();

        let config = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.workload, WorkloadSettings::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.workload.levels.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.workload.despawn_ratio = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.index.world.width = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_workload_values_rejected() {
        for step in [f64::INFINITY, f64::NAN, -1.0] {
            let mut config = AppConfig::default();
            config.workload.move_step = step;
            assert!(config.validate().is_err(), "move_step {step} accepted");
        }

        for radius in [f64::INFINITY, f64::NAN] {
            let mut config = AppConfig::default();
            config.workload.query_radius = radius;
            assert!(config.validate().is_err(), "query_radius {radius} accepted");
        }

        let mut config = AppConfig::default();
        config.workload.move_step = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = AppConfig::default();
        let args = CliArgs {
            config_path: PathBuf::from("unused.toml"),
            objects: Some(10),
            ticks: Some(3),
            seed: Some(99),
            log_level: Some("trace".to_string()),
            json_logs: true,
        };

        config.apply_overrides(&args);

        assert_eq!(config.workload.object_count, 10);
        assert_eq!(config.workload.ticks, 3);
        assert_eq!(config.workload.seed, 99);
        assert_eq!(config.logging.level, "trace");
        assert!(config.logging.json_format);
    }
}
