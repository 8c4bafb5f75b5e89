/// Records stored in the spatial index
use crate::bounds::BoundingBox;
use crate::types::{ObjectId, SpatialObjectType};
use crate::utils::current_timestamp_millis;
use serde::{Deserialize, Serialize};

/// Object stored in the spatial index.
///
/// `payload` belongs to the caller (typically a handle back to an entity)
/// and is carried along untouched. The index never reads it; all geometry
/// comes from `bounds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialObject<P> {
    /// Identity of the object, unique within one index
    pub id: ObjectId,
    /// Category used for filtered lookups
    pub object_type: SpatialObjectType,
    /// Current extent in world space
    pub bounds: BoundingBox,
    /// Caller-owned data
    pub payload: P,
    /// Milliseconds since the Unix epoch of the last add or update
    pub last_update: u64,
}

impl<P> SpatialObject<P> {
    /// Creates a new spatial object stamped with the current time
    pub fn new(
        id: impl Into<ObjectId>,
        object_type: SpatialObjectType,
        bounds: BoundingBox,
        payload: P,
    ) -> Self {
        Self {
            id: id.into(),
            object_type,
            bounds,
            payload,
            last_update: current_timestamp_millis(),
        }
    }

    /// Moves the object, refreshing its timestamp. Id, type and payload
    /// are left as they are.
    pub(crate) fn relocate(&mut self, bounds: BoundingBox) {
        self.bounds = bounds;
        self.last_update = current_timestamp_millis();
    }

    /// Distance from the object's bounds to a point (0 if inside)
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        self.bounds.distance_to_point(x, y)
    }
}
