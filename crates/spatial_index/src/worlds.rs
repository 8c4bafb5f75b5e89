/// Per-level ownership of spatial indices
use crate::config::IndexConfig;
use crate::error::{ConfigError, SpatialError};
use crate::index::SpatialIndex;
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

/// Failure to load a level
#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One spatial index per loaded level.
///
/// An index lives exactly as long as its level: it is built on
/// [`load_level`](Self::load_level) and dropped (or handed back) on
/// [`unload_level`](Self::unload_level). Consumers borrow the index of
/// the level they work in.
#[derive(Debug)]
pub struct SpatialWorlds<P> {
    levels: HashMap<String, SpatialIndex<P>>,
}

impl<P> Default for SpatialWorlds<P> {
    fn default() -> Self {
        Self {
            levels: HashMap::new(),
        }
    }
}

impl<P: Clone> SpatialWorlds<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an empty index for a level.
    ///
    /// # Arguments
    /// * `name` - Level name, unique among loaded levels
    /// * `config` - Index settings; validated before the index is built
    ///
    /// # Returns
    /// * `Result<&mut SpatialIndex<P>, LevelLoadError>` - The new index, or
    ///   `LevelExists` if the name is taken, or the config validation error
    ///
    /// # Examples
    /// ```
    /// use spatial_index::{IndexConfig, SpatialWorlds};
    ///
    /// let mut worlds: SpatialWorlds<u32> = SpatialWorlds::new();
    /// let index = worlds.load_level("dungeon", &IndexConfig::default()).unwrap();
    /// assert!(index.is_empty());
    /// assert!(worlds.load_level("dungeon", &IndexConfig::default()).is_err());
    /// ```
    pub fn load_level(
        &mut self,
        name: impl Into<String>,
        config: &IndexConfig,
    ) -> Result<&mut SpatialIndex<P>, LevelLoadError> {
        let name = name.into();
        if self.levels.contains_key(&name) {
            return Err(SpatialError::LevelExists(name).into());
        }

        let index = SpatialIndex::from_config(config)?;
        info!("🗺️ Loaded spatial index for level '{}'", name);
        Ok(self.levels.entry(name).or_insert(index))
    }

    /// Removes a level, returning its index
    pub fn unload_level(&mut self, name: &str) -> Option<SpatialIndex<P>> {
        let index = self.levels.remove(name)?;
        info!("Unloaded level '{}' ({} objects)", name, index.len());
        Some(index)
    }

    pub fn level(&self, name: &str) -> Option<&SpatialIndex<P>> {
        self.levels.get(name)
    }

    pub fn level_mut(&mut self, name: &str) -> Option<&mut SpatialIndex<P>> {
        self.levels.get_mut(name)
    }

    /// Names of the loaded levels, sorted
    pub fn level_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.levels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Runs the integrity check on every level; true if all pass
    pub fn validate_all(&self) -> bool {
        self.levels.values().all(SpatialIndex::validate_integrity)
    }
}
