//! # Spatial Index
//!
//! [`SpatialIndex`] owns a quadtree over fixed world bounds together with an
//! id → object cache that mirrors the tree. The cache answers lookups by id
//! in O(1); the tree answers every geometric query. Both are updated
//! together by each mutating call, and [`SpatialIndex::validate_integrity`]
//! checks that they still agree.
//!
//! The index is single-writer: mutation takes `&mut self`, queries take
//! `&self`. Statistics counters are atomics, so a caller that wants to
//! share an index across threads can put it behind its own `RwLock`.

use crate::bounds::BoundingBox;
use crate::config::IndexConfig;
use crate::error::{ConfigError, SpatialError, SpatialResult};
use crate::node::{NodeStats, QuadTreeNode, DEFAULT_MAX_DEPTH, DEFAULT_MAX_OBJECTS};
use crate::object::SpatialObject;
use crate::types::{ObjectId, SpatialObjectType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// World bounds used by [`SpatialIndex::default`]
pub const DEFAULT_WORLD_BOUNDS: BoundingBox = BoundingBox::new(0.0, 0.0, 10_000.0, 10_000.0);
/// First radius tried by [`SpatialIndex::query_nearest`]
pub const DEFAULT_NEAREST_RADIUS: f64 = 100.0;

#[derive(Debug, Default)]
struct Counters {
    objects_added: AtomicU64,
    objects_removed: AtomicU64,
    objects_updated: AtomicU64,
    queries_performed: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    rebuilds: AtomicU64,
    clears: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn read(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

/// Snapshot of index activity and tree shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub objects_added: u64,
    pub objects_removed: u64,
    pub objects_updated: u64,
    pub queries_performed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub rebuilds: u64,
    pub clears: u64,
    pub total_objects: usize,
    pub tree: NodeStats,
    pub world_bounds: BoundingBox,
}

/// Outcome of [`SpatialIndex::optimize`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizeReport {
    /// Wall time spent rebuilding
    pub elapsed_micros: u64,
    pub objects_rebuilt: usize,
    /// Deepest node after the rebuild
    pub new_tree_depth: u8,
}

/// Dynamic 2D spatial index over a fixed world rectangle.
///
/// # Examples
///
/// ```rust
/// use spatial_index::{BoundingBox, SpatialIndex, SpatialObjectType};
///
/// let mut index = SpatialIndex::new(BoundingBox::new(0.0, 0.0, 1000.0, 1000.0));
/// let bounds = BoundingBox::new(10.0, 10.0, 5.0, 5.0);
/// assert!(index.add_object("a1", bounds, SpatialObjectType::Entity, 7u32));
///
/// let near = index.query_radius(12.5, 12.5, 50.0);
/// assert_eq!(near.len(), 1);
/// assert_eq!(near[0].payload, 7);
/// assert!(index.validate_integrity());
/// ```
#[derive(Debug)]
pub struct SpatialIndex<P> {
    world_bounds: BoundingBox,
    max_objects: usize,
    max_depth: u8,
    nearest_initial_radius: f64,
    root: QuadTreeNode<P>,
    object_cache: HashMap<ObjectId, SpatialObject<P>>,
    counters: Counters,
}

impl<P: Clone> Default for SpatialIndex<P> {
    fn default() -> Self {
        Self::new(DEFAULT_WORLD_BOUNDS)
    }
}

impl<P: Clone> SpatialIndex<P> {
    /// Creates an index with the default node capacity and depth limit.
    ///
    /// The world bounds are taken as given; use [`try_new`](Self::try_new)
    /// for bounds that come from outside the program.
    pub fn new(world_bounds: BoundingBox) -> Self {
        Self::with_limits(world_bounds, DEFAULT_MAX_OBJECTS, DEFAULT_MAX_DEPTH)
    }

    /// Like [`new`](Self::new), but rejects world bounds that are not
    /// finite or have a negative extent.
    pub fn try_new(world_bounds: BoundingBox) -> SpatialResult<Self> {
        Self::try_with_limits(world_bounds, DEFAULT_MAX_OBJECTS, DEFAULT_MAX_DEPTH)
    }

    /// Like [`with_limits`](Self::with_limits), with the world bounds
    /// checked first.
    pub fn try_with_limits(
        world_bounds: BoundingBox,
        max_objects: usize,
        max_depth: u8,
    ) -> SpatialResult<Self> {
        if !world_bounds.is_valid() {
            return Err(world_bounds.invalid());
        }
        Ok(Self::with_limits(world_bounds, max_objects, max_depth))
    }

    /// Creates an index with explicit node capacity and depth limit
    pub fn with_limits(world_bounds: BoundingBox, max_objects: usize, max_depth: u8) -> Self {
        Self {
            world_bounds,
            max_objects,
            max_depth,
            nearest_initial_radius: DEFAULT_NEAREST_RADIUS,
            root: QuadTreeNode::new(world_bounds, max_objects, max_depth),
            object_cache: HashMap::new(),
            counters: Counters::default(),
        }
    }

    /// Creates an index from validated configuration
    pub fn from_config(config: &IndexConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut index = Self::with_limits(
            config.world.to_bounds(),
            config.max_objects_per_node,
            config.max_depth,
        );
        index.nearest_initial_radius = config.nearest_initial_radius;
        Ok(index)
    }

    /// Fixed region every object must lie in
    pub fn world_bounds(&self) -> &BoundingBox {
        &self.world_bounds
    }

    /// Root of the underlying quadtree
    pub fn root(&self) -> &QuadTreeNode<P> {
        &self.root
    }

    /// Number of indexed objects
    pub fn len(&self) -> usize {
        self.object_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_cache.is_empty()
    }

    /// Cache membership test; does not touch hit/miss counters
    pub fn contains(&self, id: impl AsRef<str>) -> bool {
        self.object_cache.contains_key(id.as_ref())
    }

    /// Adds an object, rejecting duplicate ids and bounds outside the world.
    pub fn try_add_object(
        &mut self,
        id: impl Into<ObjectId>,
        bounds: BoundingBox,
        object_type: SpatialObjectType,
        payload: P,
    ) -> SpatialResult<()> {
        let id = id.into();
        if self.object_cache.contains_key(&id) {
            return Err(SpatialError::DuplicateId(id));
        }
        if !bounds.is_valid() {
            return Err(bounds.invalid());
        }
        if !self.world_bounds.contains_box(&bounds) {
            return Err(bounds.out_of_bounds());
        }

        self.store(SpatialObject::new(id, object_type, bounds, payload))?;
        Counters::bump(&self.counters.objects_added);
        Ok(())
    }

    /// Inserts into the tree and the cache together. If the tree refuses
    /// the object, the cache is left without it as well.
    fn store(&mut self, object: SpatialObject<P>) -> SpatialResult<()> {
        if !self.root.insert(object.clone()) {
            self.object_cache.remove(&object.id);
            return Err(object.bounds.out_of_bounds());
        }

        self.object_cache.insert(object.id.clone(), object);
        Ok(())
    }

    /// Adds an object to the tree and the id cache.
    ///
    /// Duplicate ids are logged as warnings; other rejections at debug
    /// level. Use [`try_add_object`](Self::try_add_object) to get the
    /// reason back.
    ///
    /// # Arguments
    /// * `id` - Unique id of the object within this index
    /// * `bounds` - Extent of the object, must lie inside the world bounds
    /// * `object_type` - Type tag used by filtered queries
    /// * `payload` - Caller data stored with the object and never inspected
    ///
    /// # Returns
    /// * `bool` - True if added; false, leaving the index untouched, if the
    ///   id is already present or the bounds are not inside the world
    ///
    /// # Examples
    /// ```
    /// use spatial_index::{BoundingBox, SpatialIndex, SpatialObjectType};
    ///
    /// let mut index = SpatialIndex::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0));
    /// let bounds = BoundingBox::new(1.0, 1.0, 2.0, 2.0);
    /// assert!(index.add_object("orc", bounds, SpatialObjectType::Entity, 1u32));
    /// assert!(!index.add_object("orc", bounds, SpatialObjectType::Entity, 2u32));
    /// ```
    pub fn add_object(
        &mut self,
        id: impl Into<ObjectId>,
        bounds: BoundingBox,
        object_type: SpatialObjectType,
        payload: P,
    ) -> bool {
        match self.try_add_object(id, bounds, object_type, payload) {
            Ok(()) => true,
            Err(err @ SpatialError::DuplicateId(_)) => {
                warn!("Rejected add: {}", err);
                false
            }
            Err(err) => {
                debug!("Rejected add: {}", err);
                false
            }
        }
    }

    /// Removes an object from tree and cache, returning it
    pub fn try_remove_object(&mut self, id: impl AsRef<str>) -> SpatialResult<SpatialObject<P>> {
        let id = id.as_ref();
        let (key, bounds) = match self.object_cache.get_key_value(id) {
            Some((key, cached)) => (key.clone(), cached.bounds),
            None => return Err(SpatialError::UnknownId(ObjectId::from(id))),
        };

        if self.take_from_tree(&key, &bounds).is_none() {
            return Err(SpatialError::IntegrityViolation {
                missing_from_tree: vec![key],
                missing_from_cache: Vec::new(),
                duplicated_in_tree: Vec::new(),
            });
        }

        let removed = self
            .object_cache
            .remove(&key)
            .ok_or(SpatialError::UnknownId(key))?;
        Counters::bump(&self.counters.objects_removed);
        Ok(removed)
    }

    /// Removes an object. Returns false if the id is unknown.
    pub fn remove_object(&mut self, id: impl AsRef<str>) -> bool {
        match self.try_remove_object(id) {
            Ok(_) => true,
            Err(err @ SpatialError::IntegrityViolation { .. }) => {
                error!("Remove failed: {}", err);
                false
            }
            Err(err) => {
                debug!("Rejected remove: {}", err);
                false
            }
        }
    }

    /// Moves an object to `new_bounds`, keeping its id, type and payload.
    pub fn try_update_object(
        &mut self,
        id: impl AsRef<str>,
        new_bounds: BoundingBox,
    ) -> SpatialResult<()> {
        let id = id.as_ref();
        let (key, old_bounds) = match self.object_cache.get_key_value(id) {
            Some((key, cached)) => (key.clone(), cached.bounds),
            None => return Err(SpatialError::UnknownId(ObjectId::from(id))),
        };
        if !new_bounds.is_valid() {
            return Err(new_bounds.invalid());
        }
        if !self.world_bounds.contains_box(&new_bounds) {
            return Err(new_bounds.out_of_bounds());
        }

        let Some(mut object) = self.take_from_tree(&key, &old_bounds) else {
            return Err(SpatialError::IntegrityViolation {
                missing_from_tree: vec![key],
                missing_from_cache: Vec::new(),
                duplicated_in_tree: Vec::new(),
            });
        };

        let previous = object.clone();
        object.relocate(new_bounds);
        if let Err(err) = self.store(object) {
            // put the object back where it was
            self.store(previous)?;
            return Err(err);
        }

        Counters::bump(&self.counters.objects_updated);
        Ok(())
    }

    /// Moves an object. Returns false, leaving it where it was, if the id
    /// is unknown or the new bounds are not inside the world.
    pub fn update_object(&mut self, id: impl AsRef<str>, new_bounds: BoundingBox) -> bool {
        match self.try_update_object(id, new_bounds) {
            Ok(()) => true,
            Err(err @ SpatialError::IntegrityViolation { .. }) => {
                error!("Update failed: {}", err);
                false
            }
            Err(err) => {
                debug!("Rejected update: {}", err);
                false
            }
        }
    }

    /// Tree removal guided by the cached bounds, with a full search as
    /// fallback.
    fn take_from_tree(&mut self, id: &ObjectId, bounds: &BoundingBox) -> Option<SpatialObject<P>> {
        self.root
            .take_along(id, bounds)
            .or_else(|| self.root.take(id))
    }

    /// Alias of [`query_range`](Self::query_range)
    pub fn query_area(&self, bounds: &BoundingBox) -> Vec<&SpatialObject<P>> {
        self.query_range(bounds)
    }

    /// Objects whose bounds intersect `bounds` (edge contact excluded)
    pub fn query_range(&self, bounds: &BoundingBox) -> Vec<&SpatialObject<P>> {
        Counters::bump(&self.counters.queries_performed);
        self.root.query_range(bounds)
    }

    /// Objects within `radius` of the point
    pub fn query_radius(
        &self,
        center_x: f64,
        center_y: f64,
        radius: f64,
    ) -> Vec<&SpatialObject<P>> {
        Counters::bump(&self.counters.queries_performed);
        self.root.query_radius(center_x, center_y, radius)
    }

    /// Nearest object to the point, optionally restricted to one type.
    ///
    /// Expanding-ring search: radius queries starting at the configured
    /// initial radius, doubling until a candidate turns up. The last ring
    /// tried is the first one wider than the world's width plus height.
    /// Sparse worlds pay for every empty ring before the hit. A world with
    /// non-finite extents gets a single ring.
    ///
    /// # Arguments
    /// * `center_x`, `center_y` - Query point
    /// * `object_type` - Only consider objects of this type, if given
    ///
    /// # Returns
    /// * `Option<&SpatialObject<P>>` - The object whose bounds are closest
    ///   to the point, or `None` if no matching object was found
    ///
    /// # Examples
    /// ```
    /// use spatial_index::{BoundingBox, SpatialIndex, SpatialObjectType};
    ///
    /// let mut index = SpatialIndex::new(BoundingBox::new(0.0, 0.0, 1000.0, 1000.0));
    /// let goblin = BoundingBox::new(5.0, 5.0, 1.0, 1.0);
    /// let potion = BoundingBox::new(800.0, 800.0, 1.0, 1.0);
    /// index.add_object("e1", goblin, SpatialObjectType::Entity, ());
    /// index.add_object("i1", potion, SpatialObjectType::Item, ());
    ///
    /// let item = index.query_nearest(0.0, 0.0, Some(SpatialObjectType::Item));
    /// assert_eq!(item.map(|obj| obj.id.as_str()), Some("i1"));
    /// ```
    pub fn query_nearest(
        &self,
        center_x: f64,
        center_y: f64,
        object_type: Option<SpatialObjectType>,
    ) -> Option<&SpatialObject<P>> {
        let max_radius = self.world_bounds.width + self.world_bounds.height;
        let mut radius = self.nearest_initial_radius;

        loop {
            let nearest = self
                .query_radius(center_x, center_y, radius)
                .into_iter()
                .filter(|obj| object_type.map_or(true, |ty| obj.object_type == ty))
                .map(|obj| (obj.distance_to(center_x, center_y), obj))
                .min_by(|(a, _), (b, _)| a.total_cmp(b));

            if let Some((_, obj)) = nearest {
                return Some(obj);
            }
            if !(radius <= max_radius) || !max_radius.is_finite() {
                return None;
            }
            radius *= 2.0;
        }
    }

    /// O(1) lookup by id
    pub fn get_object(&self, id: impl AsRef<str>) -> Option<&SpatialObject<P>> {
        let found = self.object_cache.get(id.as_ref());
        match found {
            Some(_) => Counters::bump(&self.counters.cache_hits),
            None => Counters::bump(&self.counters.cache_misses),
        }
        found
    }

    /// Every cached object of the given type (linear scan of the cache)
    pub fn get_objects_by_type(&self, object_type: SpatialObjectType) -> Vec<&SpatialObject<P>> {
        self.object_cache
            .values()
            .filter(|obj| obj.object_type == object_type)
            .collect()
    }

    pub fn get_all_objects(&self) -> Vec<&SpatialObject<P>> {
        self.object_cache.values().collect()
    }

    /// Drops every object and starts over with an empty root
    pub fn clear(&mut self) {
        let dropped = self.object_cache.len();
        self.root = QuadTreeNode::new(self.world_bounds, self.max_objects, self.max_depth);
        self.object_cache.clear();
        Counters::bump(&self.counters.clears);
        info!("🧹 Spatial index cleared ({} objects dropped)", dropped);
    }

    /// Rebuilds the tree from the cache.
    ///
    /// Nodes never merge after removals, so heavy churn leaves a deep,
    /// sparse tree behind. Rebuilding reinserts every object into a fresh
    /// root. Timestamps are preserved; this is not an update.
    ///
    /// # Returns
    /// * `OptimizeReport` - Rebuild time, number of objects reinserted and
    ///   the depth of the deepest node afterwards
    ///
    /// # Examples
    /// ```
    /// use spatial_index::{BoundingBox, SpatialIndex, SpatialObjectType};
    ///
    /// let mut index = SpatialIndex::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0));
    /// index.add_object("a", BoundingBox::new(1.0, 1.0, 1.0, 1.0), SpatialObjectType::Item, ());
    ///
    /// let report = index.optimize();
    /// assert_eq!(report.objects_rebuilt, 1);
    /// assert!(index.validate_integrity());
    /// ```
    pub fn optimize(&mut self) -> OptimizeReport {
        let start = Instant::now();

        let objects: Vec<SpatialObject<P>> =
            std::mem::take(&mut self.object_cache).into_values().collect();
        self.root = QuadTreeNode::new(self.world_bounds, self.max_objects, self.max_depth);

        let mut rebuilt = 0;
        for object in objects {
            match self.store(object) {
                Ok(()) => rebuilt += 1,
                Err(err) => error!("❌ Dropped object during rebuild: {}", err),
            }
        }

        let report = OptimizeReport {
            elapsed_micros: start.elapsed().as_micros() as u64,
            objects_rebuilt: rebuilt,
            new_tree_depth: self.root.stats().max_depth,
        };
        Counters::bump(&self.counters.rebuilds);
        info!(
            "🔧 Rebuilt spatial index: {} objects, depth {}, {}µs",
            report.objects_rebuilt, report.new_tree_depth, report.elapsed_micros
        );
        report
    }

    /// Gets activity counters and tree statistics
    pub fn stats(&self) -> IndexStats {
        let c = &self.counters;
        IndexStats {
            objects_added: Counters::read(&c.objects_added),
            objects_removed: Counters::read(&c.objects_removed),
            objects_updated: Counters::read(&c.objects_updated),
            queries_performed: Counters::read(&c.queries_performed),
            cache_hits: Counters::read(&c.cache_hits),
            cache_misses: Counters::read(&c.cache_misses),
            rebuilds: Counters::read(&c.rebuilds),
            clears: Counters::read(&c.clears),
            total_objects: self.object_cache.len(),
            tree: self.root.stats(),
            world_bounds: self.world_bounds,
        }
    }

    /// Compares the ids reachable in the tree with the cache keys.
    pub fn check_integrity(&self) -> SpatialResult<()> {
        let mut tree_ids = Vec::with_capacity(self.object_cache.len());
        self.root.collect_ids(&mut tree_ids);

        let mut seen = HashSet::with_capacity(tree_ids.len());
        let mut duplicated_in_tree: Vec<ObjectId> = tree_ids
            .iter()
            .filter(|id| !seen.insert(**id))
            .map(|id| (*id).clone())
            .collect();

        let mut missing_from_tree: Vec<ObjectId> = self
            .object_cache
            .keys()
            .filter(|id| !seen.contains(id))
            .cloned()
            .collect();

        let mut missing_from_cache: Vec<ObjectId> = seen
            .iter()
            .filter(|id| !self.object_cache.contains_key(**id))
            .map(|id| (*id).clone())
            .collect();

        if missing_from_tree.is_empty()
            && missing_from_cache.is_empty()
            && duplicated_in_tree.is_empty()
        {
            return Ok(());
        }

        missing_from_tree.sort();
        missing_from_cache.sort();
        duplicated_in_tree.sort();
        duplicated_in_tree.dedup();
        Err(SpatialError::IntegrityViolation {
            missing_from_tree,
            missing_from_cache,
            duplicated_in_tree,
        })
    }

    /// Returns true if tree and cache hold exactly the same ids. A
    /// mismatch is logged with the differing ids; nothing is repaired.
    pub fn validate_integrity(&self) -> bool {
        match self.check_integrity() {
            Ok(()) => true,
            Err(SpatialError::IntegrityViolation {
                missing_from_tree,
                missing_from_cache,
                duplicated_in_tree,
            }) => {
                error!(
                    ?missing_from_tree,
                    ?missing_from_cache,
                    ?duplicated_in_tree,
                    "❌ Spatial index cache and tree diverged"
                );
                false
            }
            Err(err) => {
                error!("❌ Integrity check failed: {}", err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> SpatialIndex<u32> {
        SpatialIndex::new(BoundingBox::new(0.0, 0.0, 1000.0, 1000.0))
    }

    fn sorted_ids(found: &[&SpatialObject<u32>]) -> Vec<String> {
        let mut ids: Vec<String> = found.iter().map(|o| o.id.to_string()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_two_object_scenario() {
        let mut index = world();
        let a = BoundingBox::new(10.0, 10.0, 5.0, 5.0);
        let b = BoundingBox::new(500.0, 500.0, 5.0, 5.0);
        assert!(index.add_object("a1", a, SpatialObjectType::Entity, 1));
        assert!(index.add_object("b1", b, SpatialObjectType::Item, 2));

        let corner = BoundingBox::new(0.0, 0.0, 20.0, 20.0);
        assert_eq!(sorted_ids(&index.query_range(&corner)), vec!["a1"]);
        assert_eq!(sorted_ids(&index.query_radius(12.5, 12.5, 50.0)), vec!["a1"]);
        assert_eq!(index.query_nearest(0.0, 0.0, None).unwrap().id.as_str(), "a1");

        assert!(index.remove_object("a1"));
        assert!(index.get_object("a1").is_none());
        assert!(index.validate_integrity());
    }

    #[test]
    fn test_eleven_objects_split_root() {
        let mut index =
            SpatialIndex::with_limits(BoundingBox::new(0.0, 0.0, 1000.0, 1000.0), 10, 8);
        for i in 0..11 {
            let bounds = BoundingBox::new(10.0 + i as f64 * 30.0, 20.0, 5.0, 5.0);
            assert!(index.add_object(format!("o{i}"), bounds, SpatialObjectType::Entity, i));
        }

        assert!(!index.root().is_leaf());
        assert!(index.validate_integrity());
        assert_eq!(index.len(), 11);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut index = world();
        let first = BoundingBox::new(1.0, 1.0, 1.0, 1.0);
        let second = BoundingBox::new(50.0, 50.0, 1.0, 1.0);
        assert!(index.add_object("a1", first, SpatialObjectType::Entity, 1));
        assert!(!index.add_object("a1", second, SpatialObjectType::Item, 2));

        assert_eq!(
            index.try_add_object("a1", second, SpatialObjectType::Item, 2),
            Err(SpatialError::DuplicateId(ObjectId::from("a1")))
        );

        let kept = index.get_object("a1").unwrap();
        assert_eq!(kept.payload, 1);
        assert_eq!(kept.bounds, BoundingBox::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(index.stats().objects_added, 1);
    }

    #[test]
    fn test_out_of_bounds_and_invalid_rejected() {
        let mut index = world();
        let far = BoundingBox::new(1500.0, 10.0, 5.0, 5.0);
        let edge = BoundingBox::new(998.0, 998.0, 5.0, 5.0);
        let negative = BoundingBox::new(1.0, 1.0, -5.0, 5.0);
        assert!(!index.add_object("far", far, SpatialObjectType::Entity, 0));
        assert!(!index.add_object("edge", edge, SpatialObjectType::Entity, 0));
        assert!(matches!(
            index.try_add_object("neg", negative, SpatialObjectType::Entity, 0),
            Err(SpatialError::InvalidBounds { .. })
        ));

        assert!(index.is_empty());
        assert!(index.root().is_empty());
        assert!(index.validate_integrity());
    }

    #[test]
    fn test_remove_unknown_and_twice() {
        let mut index = world();
        assert!(!index.remove_object("ghost"));

        index.add_object("a1", BoundingBox::new(1.0, 1.0, 1.0, 1.0), SpatialObjectType::Entity, 0);
        assert!(index.remove_object("a1"));
        assert!(!index.remove_object("a1"));
        assert!(!index.contains("a1"));
        assert!(index.root().is_empty());
    }

    #[test]
    fn test_update_preserves_payload_and_type() {
        let mut index: SpatialIndex<String> =
            SpatialIndex::new(BoundingBox::new(0.0, 0.0, 1000.0, 1000.0));
        let bounds = BoundingBox::new(10.0, 10.0, 4.0, 4.0);
        index.add_object("chest", bounds, SpatialObjectType::Item, "loot".into());

        assert!(index.update_object("chest", BoundingBox::new(700.0, 700.0, 4.0, 4.0)));

        let cached = index.get_object("chest").unwrap();
        assert_eq!(cached.payload, "loot");
        assert_eq!(cached.object_type, SpatialObjectType::Item);
        assert_eq!(cached.bounds, BoundingBox::new(700.0, 700.0, 4.0, 4.0));

        let found = index.query_range(&BoundingBox::new(690.0, 690.0, 20.0, 20.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].payload, "loot");
        assert!(index.query_range(&BoundingBox::new(0.0, 0.0, 20.0, 20.0)).is_empty());
        assert!(index.validate_integrity());
    }

    #[test]
    fn test_update_rejections_leave_object_in_place() {
        let mut index = world();
        let bounds = BoundingBox::new(10.0, 10.0, 4.0, 4.0);
        index.add_object("a1", bounds, SpatialObjectType::Entity, 9);

        assert!(!index.update_object("a1", BoundingBox::new(2000.0, 10.0, 4.0, 4.0)));
        assert!(!index.update_object("ghost", BoundingBox::new(20.0, 10.0, 4.0, 4.0)));

        assert_eq!(index.get_object("a1").unwrap().bounds, BoundingBox::new(10.0, 10.0, 4.0, 4.0));
        assert_eq!(index.query_range(&BoundingBox::new(0.0, 0.0, 20.0, 20.0)).len(), 1);
        assert_eq!(index.stats().objects_updated, 0);
        assert!(index.validate_integrity());
    }

    #[test]
    fn test_nearest_with_type_filter() {
        let mut index = world();
        index.add_object("e1", BoundingBox::new(5.0, 5.0, 1.0, 1.0), SpatialObjectType::Entity, 0);
        let near_item = BoundingBox::new(300.0, 300.0, 1.0, 1.0);
        let far_item = BoundingBox::new(900.0, 900.0, 1.0, 1.0);
        index.add_object("i1", near_item, SpatialObjectType::Item, 0);
        index.add_object("i2", far_item, SpatialObjectType::Item, 0);

        assert_eq!(index.query_nearest(0.0, 0.0, None).unwrap().id.as_str(), "e1");
        assert_eq!(
            index.query_nearest(0.0, 0.0, Some(SpatialObjectType::Item)).unwrap().id.as_str(),
            "i1"
        );
        assert!(index.query_nearest(0.0, 0.0, Some(SpatialObjectType::Trigger)).is_none());
    }

    #[test]
    fn test_nearest_in_empty_index() {
        let index = world();
        assert!(index.query_nearest(500.0, 500.0, None).is_none());
    }

    #[test]
    fn test_nearest_in_world_smaller_than_first_ring() {
        let mut index: SpatialIndex<()> = SpatialIndex::new(BoundingBox::new(0.0, 0.0, 30.0, 20.0));
        let bounds = BoundingBox::new(29.0, 19.0, 1.0, 1.0);
        index.add_object("tiny", bounds, SpatialObjectType::Effect, ());
        assert_eq!(index.query_nearest(0.0, 0.0, None).unwrap().id.as_str(), "tiny");
    }

    #[test]
    fn test_nearest_terminates_in_non_finite_world() {
        let worlds = [
            BoundingBox::new(0.0, 0.0, f64::INFINITY, f64::INFINITY),
            BoundingBox::new(0.0, 0.0, f64::NAN, 100.0),
        ];

        for bounds in worlds {
            let index: SpatialIndex<()> = SpatialIndex::new(bounds);
            assert!(index.query_nearest(0.0, 0.0, Some(SpatialObjectType::Item)).is_none());
        }
    }

    #[test]
    fn test_try_new_rejects_non_finite_world() {
        let worlds = [
            BoundingBox::new(0.0, 0.0, f64::INFINITY, 100.0),
            BoundingBox::new(0.0, 0.0, 100.0, f64::NAN),
            BoundingBox::new(f64::NEG_INFINITY, 0.0, 100.0, 100.0),
            BoundingBox::new(0.0, 0.0, -1.0, 100.0),
        ];

        for bounds in worlds {
            assert!(matches!(
                SpatialIndex::<()>::try_new(bounds),
                Err(SpatialError::InvalidBounds { .. })
            ));
        }

        let index: SpatialIndex<u32> =
            SpatialIndex::try_with_limits(BoundingBox::new(0.0, 0.0, 10.0, 10.0), 4, 3).unwrap();
        assert_eq!(index.root().max_objects(), 4);
        assert_eq!(index.root().max_depth(), 3);
    }

    #[test]
    fn test_store_refused_by_tree_leaves_cache_clean() {
        let mut index = world();
        let stray = SpatialObject::new(
            "stray",
            SpatialObjectType::Entity,
            BoundingBox::new(5000.0, 5000.0, 1.0, 1.0),
            0,
        );

        assert!(matches!(index.store(stray), Err(SpatialError::OutOfBounds { .. })));
        assert!(!index.contains("stray"));
        assert!(index.validate_integrity());
    }

    #[test]
    fn test_optimize_drops_objects_the_tree_refuses() {
        let mut index = world();
        let bounds = BoundingBox::new(1.0, 1.0, 1.0, 1.0);
        index.add_object("a1", bounds, SpatialObjectType::Entity, 1);
        let stray = SpatialObject::new(
            "stray",
            SpatialObjectType::Entity,
            BoundingBox::new(5000.0, 5000.0, 1.0, 1.0),
            2,
        );
        index.object_cache.insert(stray.id.clone(), stray);
        assert!(!index.validate_integrity());

        let report = index.optimize();

        assert_eq!(report.objects_rebuilt, 1);
        assert!(!index.contains("stray"));
        assert_eq!(index.get_object("a1").unwrap().payload, 1);
        assert!(index.validate_integrity());
    }

    #[test]
    fn test_cache_hit_miss_counters() {
        let mut index = world();
        index.add_object("a1", BoundingBox::new(1.0, 1.0, 1.0, 1.0), SpatialObjectType::Entity, 0);

        index.get_object("a1");
        index.get_object("a1");
        index.get_object("zz");
        index.query_range(&BoundingBox::new(0.0, 0.0, 5.0, 5.0));
        index.query_area(&BoundingBox::new(0.0, 0.0, 5.0, 5.0));

        let stats = index.stats();
        assert_eq!(stats.cache_hits, 2);
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.queries_performed, 2);
        assert_eq!(stats.total_objects, 1);
    }

    #[test]
    fn test_objects_by_type() {
        let mut index = world();
        index.add_object("e1", BoundingBox::new(1.0, 1.0, 1.0, 1.0), SpatialObjectType::Entity, 0);
        let p1 = BoundingBox::new(2.0, 2.0, 1.0, 1.0);
        let p2 = BoundingBox::new(3.0, 3.0, 1.0, 1.0);
        index.add_object("p1", p1, SpatialObjectType::Projectile, 0);
        index.add_object("p2", p2, SpatialObjectType::Projectile, 0);

        let projectiles = index.get_objects_by_type(SpatialObjectType::Projectile);
        assert_eq!(sorted_ids(&projectiles), vec!["p1", "p2"]);
        assert!(index.get_objects_by_type(SpatialObjectType::Trigger).is_empty());
        assert_eq!(index.get_all_objects().len(), 3);
    }

    #[test]
    fn test_clear_resets_tree_and_cache() {
        let mut index = world();
        for i in 0..50 {
            let bounds = BoundingBox::new(i as f64 * 15.0, 5.0, 2.0, 2.0);
            index.add_object(format!("o{i}"), bounds, SpatialObjectType::Entity, i);
        }
        assert!(!index.root().is_leaf());

        index.clear();

        assert!(index.is_empty());
        assert!(index.root().is_leaf());
        assert_eq!(index.stats().clears, 1);
        assert!(index.validate_integrity());
        let bounds = BoundingBox::new(1.0, 1.0, 1.0, 1.0);
        assert!(index.add_object("o1", bounds, SpatialObjectType::Entity, 1));
    }

    #[test]
    fn test_optimize_compacts_churned_tree() {
        let mut index = SpatialIndex::with_limits(BoundingBox::new(0.0, 0.0, 1024.0, 1024.0), 2, 8);
        for i in 0..64 {
            let bounds = BoundingBox::new(i as f64, i as f64, 0.5, 0.5);
            index.add_object(format!("o{i}"), bounds, SpatialObjectType::Entity, i);
        }
        for i in 2..64 {
            assert!(index.remove_object(format!("o{i}")));
        }
        let before = index.stats().tree;

        let report = index.optimize();

        assert_eq!(report.objects_rebuilt, 2);
        assert!(report.new_tree_depth < before.max_depth);
        assert!(index.root().is_leaf());
        assert_eq!(index.stats().rebuilds, 1);
        assert_eq!(index.get_object("o0").unwrap().payload, 0);
        assert!(index.validate_integrity());
    }

    #[test]
    fn test_integrity_detects_tree_only_object() {
        let mut index = world();
        index.add_object("a1", BoundingBox::new(1.0, 1.0, 1.0, 1.0), SpatialObjectType::Entity, 0);
        let stray = BoundingBox::new(3.0, 3.0, 1.0, 1.0);
        index.root.insert(SpatialObject::new("stray", SpatialObjectType::Entity, stray, 0));

        assert!(!index.validate_integrity());
        assert_eq!(
            index.check_integrity(),
            Err(SpatialError::IntegrityViolation {
                missing_from_tree: vec![],
                missing_from_cache: vec![ObjectId::from("stray")],
                duplicated_in_tree: vec![],
            })
        );
    }

    #[test]
    fn test_integrity_detects_cache_only_object() {
        let mut index = world();
        index.add_object("a1", BoundingBox::new(1.0, 1.0, 1.0, 1.0), SpatialObjectType::Entity, 0);
        index.root.remove(&ObjectId::from("a1"));

        assert!(!index.validate_integrity());
        assert!(matches!(
            index.check_integrity(),
            Err(SpatialError::IntegrityViolation { ref missing_from_tree, .. })
                if missing_from_tree == &vec![ObjectId::from("a1")]
        ));

        // removal must not leave the cache half-updated
        assert!(!index.remove_object("a1"));
        assert!(index.contains("a1"));
    }

    #[test]
    fn test_integrity_detects_duplicate_in_tree() {
        let mut index = world();
        index.add_object("a1", BoundingBox::new(1.0, 1.0, 1.0, 1.0), SpatialObjectType::Entity, 0);
        let copy = BoundingBox::new(600.0, 600.0, 1.0, 1.0);
        index.root.insert(SpatialObject::new("a1", SpatialObjectType::Entity, copy, 0));

        assert!(matches!(
            index.check_integrity(),
            Err(SpatialError::IntegrityViolation { ref duplicated_in_tree, .. })
                if duplicated_in_tree.len() == 1
        ));
    }

    #[test]
    fn test_from_config() {
        let mut config = IndexConfig::default();
        config.max_objects_per_node = 4;
        config.max_depth = 3;
        config.nearest_initial_radius = 10.0;

        let index: SpatialIndex<()> = SpatialIndex::from_config(&config).unwrap();
        assert_eq!(index.root().max_objects(), 4);
        assert_eq!(index.root().max_depth(), 3);
        assert_eq!(*index.world_bounds(), DEFAULT_WORLD_BOUNDS);

        config.max_objects_per_node = 0;
        assert!(SpatialIndex::<()>::from_config(&config).is_err());
    }

    #[test]
    fn test_default_world() {
        let index: SpatialIndex<()> = SpatialIndex::default();
        assert_eq!(*index.world_bounds(), BoundingBox::new(0.0, 0.0, 10_000.0, 10_000.0));
        assert_eq!(index.root().max_objects(), DEFAULT_MAX_OBJECTS);
        assert_eq!(index.root().max_depth(), DEFAULT_MAX_DEPTH);
    }
}
