/// Adaptive quadtree node for spatial indexing
/// Splits into four quadrants once a leaf exceeds its capacity, down to a fixed depth limit
use crate::bounds::BoundingBox;
use crate::object::SpatialObject;
use crate::types::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of objects a leaf holds before it splits
pub const DEFAULT_MAX_OBJECTS: usize = 10;
/// Default depth limit; leaves at this depth never split
pub const DEFAULT_MAX_DEPTH: u8 = 8;

/// A node in the quadtree.
///
/// A node is either a leaf (no children) or split (exactly four children in
/// NW, NE, SW, SE order). A split node still keeps the objects that do not
/// fit entirely inside a single quadrant. Children are created once, when
/// the node splits, and are never merged back; call
/// [`SpatialIndex::optimize`](crate::SpatialIndex::optimize) to rebuild a
/// tree that has grown deep under churn.
#[derive(Debug, Clone)]
pub struct QuadTreeNode<P> {
    /// Region covered by this node
    bounds: BoundingBox,
    /// Leaf capacity before splitting
    max_objects: usize,
    /// Depth at which splitting stops
    max_depth: u8,
    /// Depth of this node, root is 0
    depth: u8,
    /// Objects assigned directly to this node
    objects: Vec<SpatialObject<P>>,
    /// Child nodes (NW, NE, SW, SE) - None if leaf
    children: Option<Box<[QuadTreeNode<P>; 4]>>,
}

impl<P> QuadTreeNode<P> {
    /// Creates a root node with the given limits
    pub fn new(bounds: BoundingBox, max_objects: usize, max_depth: u8) -> Self {
        Self::with_depth(bounds, max_objects, max_depth, 0)
    }

    fn with_depth(bounds: BoundingBox, max_objects: usize, max_depth: u8, depth: u8) -> Self {
        Self {
            bounds,
            max_objects,
            max_depth,
            depth,
            objects: Vec::new(),
            children: None,
        }
    }

    /// Region covered by this node
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Depth of this node, 0 for the root
    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn max_objects(&self) -> usize {
        self.max_objects
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Objects held directly by this node (not its descendants)
    pub fn objects(&self) -> &[SpatialObject<P>] {
        &self.objects
    }

    /// The four children in NW, NE, SW, SE order, if split
    pub fn children(&self) -> Option<&[QuadTreeNode<P>; 4]> {
        self.children.as_deref()
    }

    /// True until the node splits
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Number of objects in this node and all descendants
    pub fn len(&self) -> usize {
        let nested: usize = self
            .children()
            .map(|children| children.iter().map(QuadTreeNode::len).sum())
            .unwrap_or(0);
        self.objects.len() + nested
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts an object into the subtree.
    ///
    /// Returns false, and drops the object, if this node's bounds do not
    /// fully contain the object's bounds. Once contained the insert always
    /// succeeds: a full leaf splits (below `max_depth`) or grows (at
    /// `max_depth`), and an object that straddles the quadrant lines stays
    /// on this node.
    pub fn insert(&mut self, object: SpatialObject<P>) -> bool {
        self.place(object).is_ok()
    }

    /// Insert that hands the object back when it is not contained
    fn place(&mut self, object: SpatialObject<P>) -> Result<(), SpatialObject<P>> {
        if !self.bounds.contains_box(&object.bounds) {
            return Err(object);
        }

        if self.is_leaf() {
            if self.objects.len() < self.max_objects {
                self.objects.push(object);
                return Ok(());
            }

            if self.depth >= self.max_depth {
                self.objects.push(object);
                return Ok(());
            }

            self.split();
        }

        if let Err(object) = self.push_to_child(object) {
            self.objects.push(object);
        }
        Ok(())
    }

    /// Routes an object into the first child (NW, NE, SW, SE) that fully
    /// contains it. Fails on leaves and on objects straddling quadrants.
    fn push_to_child(&mut self, object: SpatialObject<P>) -> Result<(), SpatialObject<P>> {
        let Some(children) = self.children.as_deref_mut() else {
            return Err(object);
        };

        match children
            .iter_mut()
            .find(|child| child.bounds.contains_box(&object.bounds))
        {
            Some(child) => child.place(object),
            None => Err(object),
        }
    }

    /// Subdivides this node into 4 children and redistributes its objects
    fn split(&mut self) {
        let (max_objects, max_depth) = (self.max_objects, self.max_depth);
        let child_depth = self.depth + 1;
        let [nw, ne, sw, se] = self.bounds.quadrants();
        let make = |bounds| Self::with_depth(bounds, max_objects, max_depth, child_depth);

        self.children = Some(Box::new([make(nw), make(ne), make(sw), make(se)]));

        let objects = std::mem::take(&mut self.objects);
        let held = objects.len();
        for object in objects {
            if let Err(object) = self.push_to_child(object) {
                self.objects.push(object);
            }
        }

        debug!(
            depth = self.depth,
            redistributed = held - self.objects.len(),
            kept = self.objects.len(),
            "Split quadtree node"
        );
    }

    /// Returns every object in the subtree whose bounds intersect
    /// `query`. Result order is unspecified.
    pub fn query_range(&self, query: &BoundingBox) -> Vec<&SpatialObject<P>> {
        let mut results = Vec::new();
        self.collect_range(query, &mut results);
        results
    }

    fn collect_range<'a>(&'a self, query: &BoundingBox, results: &mut Vec<&'a SpatialObject<P>>) {
        // Early exit if query bounds don't intersect with node bounds
        if !self.bounds.intersects(query) {
            return;
        }

        results.extend(self.objects.iter().filter(|obj| obj.bounds.intersects(query)));

        if let Some(children) = self.children() {
            for child in children {
                child.collect_range(query, results);
            }
        }
    }

    /// Returns every object within `radius` of `(center_x, center_y)`.
    ///
    /// Two phases: a range query over the square enclosing the circle
    /// prunes the tree, then candidates are filtered by exact distance.
    /// Objects that only touch the square's edge are not candidates.
    pub fn query_radius(
        &self,
        center_x: f64,
        center_y: f64,
        radius: f64,
    ) -> Vec<&SpatialObject<P>> {
        if !(radius >= 0.0) {
            return Vec::new();
        }

        let square = BoundingBox::from_circle(center_x, center_y, radius);
        let mut candidates = self.query_range(&square);
        candidates.retain(|obj| obj.distance_to(center_x, center_y) <= radius);
        candidates
    }

    /// Removes the object with the given id from the subtree, searching
    /// this node first and then each child in turn.
    pub fn remove(&mut self, id: &ObjectId) -> bool {
        self.take(id).is_some()
    }

    /// Removes and returns the object with the given id
    pub fn take(&mut self, id: &ObjectId) -> Option<SpatialObject<P>> {
        if let Some(pos) = self.objects.iter().position(|obj| &obj.id == id) {
            return Some(self.objects.swap_remove(pos));
        }

        self.children
            .as_deref_mut()?
            .iter_mut()
            .find_map(|child| child.take(id))
    }

    /// Like [`take`](Self::take), but only descends along the path an
    /// object with `bounds` would have been routed on insert.
    pub(crate) fn take_along(
        &mut self,
        id: &ObjectId,
        bounds: &BoundingBox,
    ) -> Option<SpatialObject<P>> {
        if let Some(pos) = self.objects.iter().position(|obj| &obj.id == id) {
            return Some(self.objects.swap_remove(pos));
        }

        self.children
            .as_deref_mut()?
            .iter_mut()
            .find(|child| child.bounds.contains_box(bounds))?
            .take_along(id, bounds)
    }

    /// Moves an object within the subtree, keeping its id, type and
    /// payload. Returns false without touching the tree if the id is
    /// absent or `new_bounds` falls outside this node.
    pub fn update_object(&mut self, id: &ObjectId, new_bounds: BoundingBox) -> bool {
        if !self.bounds.contains_box(&new_bounds) {
            return false;
        }

        match self.take(id) {
            Some(mut object) => {
                object.relocate(new_bounds);
                self.insert(object)
            }
            None => false,
        }
    }

    /// Visits every object in the subtree, parents before children
    pub fn for_each_object<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a SpatialObject<P>),
    {
        self.objects.iter().for_each(&mut *f);

        if let Some(children) = self.children() {
            for child in children {
                child.for_each_object(f);
            }
        }
    }

    /// Collects the id of every object in the subtree
    pub fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a ObjectId>) {
        self.for_each_object(&mut |obj| ids.push(&obj.id));
    }

    /// Gets statistics about this subtree
    pub fn stats(&self) -> NodeStats {
        let mut stats = NodeStats {
            total_objects: self.objects.len(),
            max_depth: self.depth,
            leaf_nodes: 0,
            internal_nodes: 0,
            overfull_leaves: 0,
        };

        match self.children() {
            None => {
                stats.leaf_nodes = 1;
                if self.objects.len() > self.max_objects {
                    stats.overfull_leaves = 1;
                }
            }
            Some(children) => {
                stats.internal_nodes = 1;
                for child in children {
                    let child_stats = child.stats();
                    stats.total_objects += child_stats.total_objects;
                    stats.max_depth = stats.max_depth.max(child_stats.max_depth);
                    stats.leaf_nodes += child_stats.leaf_nodes;
                    stats.internal_nodes += child_stats.internal_nodes;
                    stats.overfull_leaves += child_stats.overfull_leaves;
                }
            }
        }

        stats
    }
}

/// Statistics for analyzing quadtree shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStats {
    pub total_objects: usize,
    pub max_depth: u8,
    pub leaf_nodes: usize,
    pub internal_nodes: usize,
    /// Leaves holding more than `max_objects`; only legal at `max_depth`
    pub overfull_leaves: usize,
}
