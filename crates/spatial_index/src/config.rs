//! Configuration for spatial indices.
//!
//! Loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration.

use crate::bounds::BoundingBox;
use crate::error::ConfigError;
use crate::index::{DEFAULT_NEAREST_RADIUS, DEFAULT_WORLD_BOUNDS};
use crate::node::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_OBJECTS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

fn default_max_objects() -> usize {
    DEFAULT_MAX_OBJECTS
}

fn default_max_depth() -> u8 {
    DEFAULT_MAX_DEPTH
}

fn default_nearest_radius() -> f64 {
    DEFAULT_NEAREST_RADIUS
}

/// Settings for one [`SpatialIndex`](crate::SpatialIndex).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// World rectangle covered by the root node
    #[serde(default)]
    pub world: WorldBoundsSettings,
    /// Leaf capacity before a node splits
    #[serde(default = "default_max_objects")]
    pub max_objects_per_node: usize,
    /// Depth at which nodes stop splitting
    #[serde(default = "default_max_depth")]
    pub max_depth: u8,
    /// First radius tried by nearest-neighbor search
    #[serde(default = "default_nearest_radius")]
    pub nearest_initial_radius: f64,
}

/// World rectangle in the same `{x, y, width, height}` form as
/// [`BoundingBox`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBoundsSettings {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for WorldBoundsSettings {
    fn default() -> Self {
        Self {
            x: DEFAULT_WORLD_BOUNDS.x,
            y: DEFAULT_WORLD_BOUNDS.y,
            width: DEFAULT_WORLD_BOUNDS.width,
            height: DEFAULT_WORLD_BOUNDS.height,
        }
    }
}

impl WorldBoundsSettings {
    pub fn to_bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }
}

impl From<BoundingBox> for WorldBoundsSettings {
    fn from(b: BoundingBox) -> Self {
        Self {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            world: WorldBoundsSettings::default(),
            max_objects_per_node: DEFAULT_MAX_OBJECTS,
            max_depth: DEFAULT_MAX_DEPTH,
            nearest_initial_radius: DEFAULT_NEAREST_RADIUS,
        }
    }
}

impl IndexConfig {
    /// Parses a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration to it
    /// and returns the default.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
            Self::from_toml_str(&content)
        } else {
            let default_config = Self::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            std::fs::write(path, toml_content)
                .map_err(|e| ConfigError::Write(path.to_path_buf(), e))?;
            info!("Created default spatial index configuration: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = self.world.to_bounds();
        if !world.is_valid() {
            return Err(ConfigError::Invalid(format!("world bounds are not finite: {world:?}")));
        }
        if world.width <= 0.0 || world.height <= 0.0 {
            return Err(ConfigError::Invalid(
                "world width and height must be positive".to_string(),
            ));
        }
        if self.max_objects_per_node == 0 {
            return Err(ConfigError::Invalid(
                "max_objects_per_node must be at least 1".to_string(),
            ));
        }
        if !(self.nearest_initial_radius > 0.0 && self.nearest_initial_radius.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "nearest_initial_radius must be positive, got {}",
                self.nearest_initial_radius
            )));
        }
        Ok(())
    }
}
