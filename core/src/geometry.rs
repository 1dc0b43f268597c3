//! Axis-aligned box helpers used for collision tests.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Width and height of an axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Horizontal size in playfield units.
    pub width: f32,
    /// Vertical size in playfield units.
    pub height: f32,
}

impl Extent {
    /// Creates a new extent.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Reports whether both sides are finite and not negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// Axis-aligned rectangle centred on a point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    center: Vec2,
    extent: Extent,
}

impl Rect {
    /// Creates a rectangle of the given extent centred on `center`.
    #[must_use]
    pub const fn centered(center: Vec2, extent: Extent) -> Self {
        Self { center, extent }
    }

    /// Smallest x coordinate covered by the rectangle.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.center.x - self.extent.width * 0.5
    }

    /// Largest x coordinate covered by the rectangle.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.center.x + self.extent.width * 0.5
    }

    /// Smallest y coordinate covered by the rectangle.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.center.y - self.extent.height * 0.5
    }

    /// Largest y coordinate covered by the rectangle.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.center.y + self.extent.height * 0.5
    }

    /// Reports whether the two rectangles share interior area.
    ///
    /// Rectangles that merely touch along an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}
