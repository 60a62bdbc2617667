//! Axis-aligned boxes for clip layout and collision tests.
//!
//! Clips on a track are laid out horizontally in pixels. Each lane occupies
//! one unit of height, so a vertical overlap between two boxes is exactly a
//! lane match.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box for a clip spanning `[x, x + width)` on the given lane.
    #[inline]
    pub fn on_lane(x: f64, width: f64, lane: usize) -> Self {
        Self::new(x, lane as f64, width, 1.0)
    }

    #[inline]
    pub fn left(self) -> f64 {
        self.x
    }

    #[inline]
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn top(self) -> f64 {
        self.y
    }

    #[inline]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    /// Same box shifted horizontally by `dx`.
    #[inline]
    pub fn translate_x(self, dx: f64) -> Self {
        Self { x: self.x + dx, ..self }
    }

    /// Check if two rectangles overlap (strict AABB test; touching edges do not overlap).
    pub fn overlaps(self, other: Self) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Width of the horizontal intersection, or zero when disjoint.
    pub fn intersection_width(self, other: Self) -> f64 {
        let x1 = self.left().max(other.left());
        let x2 = self.right().min(other.right());
        (x2 - x1).max(0.0)
    }

    /// Whether this box lies horizontally inside `outer` (edges inclusive).
    pub fn is_within_x(self, outer: Self) -> bool {
        self.left() >= outer.left() && self.right() <= outer.right()
    }
}
