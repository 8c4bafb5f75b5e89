//! Axis-aligned bounding boxes.
//!
//! Coordinates follow screen convention: `y` grows downward, so `top` is
//! the smaller `y` and `bottom` the larger one.

use crate::error::SpatialError;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle `{x, y, width, height}`.
///
/// A value type: an object's bounds are replaced wholesale on update,
/// never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Creates a box without validation. Use [`BoundingBox::try_new`] for
    /// caller-supplied geometry.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Creates a box, rejecting non-finite coordinates and negative extents.
    pub fn try_new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, SpatialError> {
        let bounds = Self::new(x, y, width, height);
        if bounds.is_valid() {
            Ok(bounds)
        } else {
            Err(bounds.invalid())
        }
    }

    /// Box of the given size centered on `(center_x, center_y)`.
    pub fn from_center(center_x: f64, center_y: f64, width: f64, height: f64) -> Self {
        Self::new(center_x - width / 2.0, center_y - height / 2.0, width, height)
    }

    /// Smallest square enclosing the circle.
    pub fn from_circle(center_x: f64, center_y: f64, radius: f64) -> Self {
        let diameter = radius * 2.0;
        Self::new(center_x - radius, center_y - radius, diameter, diameter)
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }

    pub(crate) fn invalid(&self) -> SpatialError {
        SpatialError::InvalidBounds {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub(crate) fn out_of_bounds(&self) -> SpatialError {
        SpatialError::OutOfBounds {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Overlap test. Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Point containment, inclusive on every edge.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.left() <= x && x <= self.right() && self.top() <= y && y <= self.bottom()
    }

    /// True if `other` lies entirely inside `self`, edges inclusive.
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.left() <= other.left()
            && self.right() >= other.right()
            && self.top() <= other.top()
            && self.bottom() >= other.bottom()
    }

    /// Euclidean distance from the point to the nearest edge or corner,
    /// 0 when the point is inside.
    pub fn distance_to_point(&self, x: f64, y: f64) -> f64 {
        let dx = (self.left() - x).max(x - self.right()).max(0.0);
        let dy = (self.top() - y).max(y - self.bottom()).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }

    /// Euclidean gap between the nearest edges, 0 when the boxes touch or
    /// overlap.
    pub fn distance_to_box(&self, other: &BoundingBox) -> f64 {
        let dx = (self.left() - other.right()).max(other.left() - self.right()).max(0.0);
        let dy = (self.top() - other.bottom()).max(other.top() - self.bottom()).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }

    /// The four equal quadrants in NW, NE, SW, SE order.
    pub fn quadrants(&self) -> [BoundingBox; 4] {
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        let mid_x = self.x + half_width;
        let mid_y = self.y + half_height;

        [
            BoundingBox::new(self.x, self.y, half_width, half_height),
            BoundingBox::new(mid_x, self.y, half_width, half_height),
            BoundingBox::new(self.x, mid_y, half_width, half_height),
            BoundingBox::new(mid_x, mid_y, half_width, half_height),
        ]
    }
}
