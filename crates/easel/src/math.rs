//! Math types and glam re-exports.
//!
//! Entities are axis-aligned rectangles. A [`Placement`] says where the
//! rectangle sits and which of its corners the position refers to; the
//! resulting [`BoundingBox`] is what rendering and overlap checks work with.

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Which corner of an entity its position refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Origin {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edges of an axis-aligned box in surface coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }
}

/// Position, size, and origin corner of a rectangular entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec2,
    pub size: Vec2,
    pub origin: Origin,
}

impl Placement {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
            origin: Origin::TopLeft,
        }
    }

    /// Compute the box edges, honouring the origin corner.
    pub fn bounding_box(&self) -> BoundingBox {
        let Vec2 { x, y } = self.position;
        let Vec2 { x: w, y: h } = self.size;
        match self.origin {
            Origin::TopLeft => BoundingBox { left: x, top: y, right: x + w, bottom: y + h },
            Origin::TopRight => BoundingBox { left: x - w, top: y, right: x, bottom: y + h },
            Origin::BottomLeft => BoundingBox { left: x, top: y - h, right: x + w, bottom: y },
            Origin::BottomRight => BoundingBox { left: x - w, top: y - h, right: x, bottom: y },
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}
