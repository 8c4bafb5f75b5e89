//! # Core Type Definitions
//!
//! Identifiers and type tags attached to every object stored in the index.
//!
//! - [`ObjectId`] - Opaque, caller-chosen identifier of a spatial object
//! - [`SpatialObjectType`] - Coarse category used to filter queries

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an object in the spatial index.
///
/// The index treats ids as opaque strings. Callers usually derive them
/// from their own entity handles; [`ObjectId::new`] is available when no
/// natural id exists.
///
/// # Examples
///
/// ```rust
/// use spatial_index::ObjectId;
///
/// let named = ObjectId::from("goblin_17");
/// let numbered = ObjectId::from(42u64);
/// let random = ObjectId::new();
///
/// assert_eq!(named.as_str(), "goblin_17");
/// assert_eq!(numbered.as_str(), "42");
/// assert_ne!(random, ObjectId::new());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Creates a new random id from a UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for ObjectId {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<u64> for ObjectId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<u32> for ObjectId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<Uuid> for ObjectId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets id-keyed maps be queried with a plain &str
impl Borrow<str> for ObjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Category of a spatial object.
///
/// Only used for filtering (`query_nearest`, `get_objects_by_type`); the
/// tree itself places every type the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpatialObjectType {
    /// Characters, monsters and other actors
    Entity,
    /// Pickups lying in the world
    Item,
    /// Bullets, arrows, spells in flight
    Projectile,
    /// Short-lived visual or gameplay effects
    Effect,
    /// Invisible regions that fire when entered
    Trigger,
}

impl SpatialObjectType {
    pub const ALL: [SpatialObjectType; 5] = [
        SpatialObjectType::Entity,
        SpatialObjectType::Item,
        SpatialObjectType::Projectile,
        SpatialObjectType::Effect,
        SpatialObjectType::Trigger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpatialObjectType::Entity => "entity",
            SpatialObjectType::Item => "item",
            SpatialObjectType::Projectile => "projectile",
            SpatialObjectType::Effect => "effect",
            SpatialObjectType::Trigger => "trigger",
        }
    }
}

impl Default for SpatialObjectType {
    fn default() -> Self {
        SpatialObjectType::Entity
    }
}

impl fmt::Display for SpatialObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpatialObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown object type: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_conversions() {
        assert_eq!(ObjectId::from("a1").to_string(), "a1");
        assert_eq!(ObjectId::from(String::from("b1")).as_str(), "b1");
        assert_eq!(ObjectId::from(7u32), ObjectId::from("7"));

        let uuid = Uuid::new_v4();
        assert_eq!(ObjectId::from(uuid).as_str(), uuid.to_string());
    }

    #[test]
    fn test_object_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&ObjectId::from("a1")).unwrap();
        assert_eq!(json, "\"a1\"");
    }

    #[test]
    fn test_object_type_round_trip_names() {
        for ty in SpatialObjectType::ALL {
            assert_eq!(ty.as_str().parse::<SpatialObjectType>().unwrap(), ty);
        }
        assert_eq!("ITEM".parse::<SpatialObjectType>().unwrap(), SpatialObjectType::Item);
        assert!("vehicle".parse::<SpatialObjectType>().is_err());
    }

    #[test]
    fn test_object_type_serde_lowercase() {
        let json = serde_json::to_string(&SpatialObjectType::Projectile).unwrap();
        assert_eq!(json, "\"projectile\"");
    }
}
