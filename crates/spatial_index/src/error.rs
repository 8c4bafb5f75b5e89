//! Error types for the spatial index

use crate::types::ObjectId;
use std::{io::Error as IoError, path::PathBuf};
use thiserror::Error;

/// Rejections reported by index and node operations.
///
/// None of these are fatal. The boolean API surfaces them as `false`;
/// the `try_*` API hands them to the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    #[error("Object {0} already exists")]
    DuplicateId(ObjectId),

    #[error("Object {0} not found")]
    UnknownId(ObjectId),

    #[error("Bounds ({x}, {y}, {width}x{height}) lie outside the world")]
    OutOfBounds {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },

    #[error("Invalid bounds ({x}, {y}, {width}x{height})")]
    InvalidBounds {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },

    #[error(
        "Cache and tree diverged: {} not in tree, {} not in cache, {} duplicated in tree",
        missing_from_tree.len(),
        missing_from_cache.len(),
        duplicated_in_tree.len()
    )]
    IntegrityViolation {
        missing_from_tree: Vec<ObjectId>,
        missing_from_cache: Vec<ObjectId>,
        duplicated_in_tree: Vec<ObjectId>,
    },

    #[error("Level {0} is already loaded")]
    LevelExists(String),
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    Read(PathBuf, IoError),

    #[error("Failed to write config {0}: {1}")]
    Write(PathBuf, IoError),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
