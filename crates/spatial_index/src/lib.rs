//! # Spatial Index
//!
//! A dynamic 2D spatial index for real-time games: "what is near X" over
//! thousands of moving entities, items and projectiles.
//!
//! ## Key Types
//!
//! - [`BoundingBox`] - Axis-aligned rectangle with containment, intersection and distance tests
//! - [`SpatialObject`] - Id, type tag, bounds and an opaque caller payload
//! - [`QuadTreeNode`] - Adaptive quadtree node with capacity and depth limits
//! - [`SpatialIndex`] - Tree plus id cache; the public add/remove/update/query API
//! - [`SpatialWorlds`] - One index per loaded level
//!
//! ## Model
//!
//! The index is single-writer and fully synchronous. Every mutation keeps
//! the quadtree and the id cache in step; [`SpatialIndex::validate_integrity`]
//! verifies that they hold the same ids. Nodes never merge after removals;
//! [`SpatialIndex::optimize`] rebuilds the tree when churn has left it deep
//! and sparse.
//!
//! ```rust
//! use spatial_index::{BoundingBox, SpatialIndex, SpatialObjectType};
//!
//! let mut index = SpatialIndex::new(BoundingBox::new(0.0, 0.0, 1000.0, 1000.0));
//! let goblin = BoundingBox::new(10.0, 10.0, 5.0, 5.0);
//! let potion = BoundingBox::new(500.0, 500.0, 5.0, 5.0);
//! index.add_object("a1", goblin, SpatialObjectType::Entity, "goblin");
//! index.add_object("b1", potion, SpatialObjectType::Item, "potion");
//!
//! let nearest = index.query_nearest(0.0, 0.0, None).unwrap();
//! assert_eq!(nearest.payload, "goblin");
//!
//! index.update_object("a1", BoundingBox::new(600.0, 600.0, 5.0, 5.0));
//! let nearest_item = index.query_nearest(600.0, 600.0, Some(SpatialObjectType::Item)).unwrap();
//! assert_eq!(nearest_item.id.as_str(), "b1");
//! assert!(index.validate_integrity());
//! ```

pub mod bounds;
pub mod config;
pub mod error;
pub mod index;
pub mod node;
pub mod object;
pub mod types;
pub mod utils;
pub mod worlds;

pub use bounds::BoundingBox;
pub use config::{IndexConfig, WorldBoundsSettings};
pub use error::{ConfigError, SpatialError, SpatialResult};
pub use index::{
    IndexStats, OptimizeReport, SpatialIndex, DEFAULT_NEAREST_RADIUS, DEFAULT_WORLD_BOUNDS,
};
pub use node::{NodeStats, QuadTreeNode, DEFAULT_MAX_DEPTH, DEFAULT_MAX_OBJECTS};
pub use object::SpatialObject;
pub use types::{ObjectId, SpatialObjectType};
pub use utils::current_timestamp_millis;
pub use worlds::{LevelLoadError, SpatialWorlds};
