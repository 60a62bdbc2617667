//! Collision resolution for dragged clips.
//!
//! Works purely on pixel boxes. A dragged box that overlaps a sibling is pushed
//! out by the overlap width, in the direction of its offset from the sibling.
//! When one box swallows the other, the push goes through the nearer exit edge.
//! A push that would carry the box past a left bound goes out the right side
//! instead.

use serde::{Deserialize, Serialize};
use trackcut_core::Rect;

/// One sibling the dragged box overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Overlap {
    /// Index into the sibling slice
    pub index: usize,
    pub intersection_width: f64,
    /// `dragged.left - sibling.left`
    pub difference_x: f64,
    /// One box lies entirely inside the other
    pub contained: bool,
    /// Signed pixel push for this sibling alone
    pub correction: f64,
}

/// Computes the horizontal push that clears a dragged box of its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CollisionResolver {
    /// Extra space added to each push
    pub gutter_px: f64,
}

impl CollisionResolver {
    pub fn new(gutter_px: f64) -> Self {
        Self {
            gutter_px: if gutter_px.is_finite() { gutter_px.max(0.0) } else { 0.0 },
        }
    }

    /// Measure the overlap of `dragged` with one sibling.
    pub fn overlap(&self, index: usize, dragged: Rect, sibling: Rect) -> Option<Overlap> {
        self.overlap_within(index, dragged, sibling, f64::NEG_INFINITY)
    }

    /// Like [`overlap`](Self::overlap), but never pushes the left edge below
    /// `min_left`.
    pub fn overlap_within(&self, index: usize, dragged: Rect, sibling: Rect, min_left: f64) -> Option<Overlap> {
        if !dragged.overlaps(sibling) {
            return None;
        }
        let intersection_width = dragged.intersection_width(sibling);
        let difference_x = dragged.left() - sibling.left();

        let contained = dragged.is_within_x(sibling) || sibling.is_within_x(dragged);
        let push = if contained {
            let to_right = sibling.right() - dragged.left();
            let to_left = dragged.right() - sibling.left();
            if to_right <= to_left {
                to_right + self.gutter_px
            } else {
                -(to_left + self.gutter_px)
            }
        } else if difference_x > 0.0 {
            intersection_width + self.gutter_px
        } else {
            -(intersection_width + self.gutter_px)
        };
        let push = if push < 0.0 && dragged.left() + push < min_left {
            sibling.right() - dragged.left() + self.gutter_px
        } else {
            push
        };

        Some(Overlap {
            index,
            intersection_width,
            difference_x,
            contained,
            correction: if push.is_finite() { push } else { 0.0 },
        })
    }

    /// Every sibling the dragged box overlaps.
    pub fn overlaps(&self, dragged: Rect, siblings: &[Rect]) -> Vec<Overlap> {
        self.overlaps_within(dragged, siblings, f64::NEG_INFINITY)
    }

    fn overlaps_within(&self, dragged: Rect, siblings: &[Rect], min_left: f64) -> Vec<Overlap> {
        siblings
            .iter()
            .enumerate()
            .filter_map(|(i, s)| self.overlap_within(i, dragged, *s, min_left))
            .collect()
    }

    /// Summed correction over all overlapping siblings.
    ///
    /// Overlaps on both sides at once partially cancel and can leave the box
    /// still overlapping; callers see that as an unresolved position.
    pub fn resolve(&self, dragged: Rect, siblings: &[Rect]) -> f64 {
        self.resolve_within(dragged, siblings, f64::NEG_INFINITY)
    }

    /// Summed correction with every push kept at or right of `min_left`.
    pub fn resolve_within(&self, dragged: Rect, siblings: &[Rect], min_left: f64) -> f64 {
        self.overlaps_within(dragged, siblings, min_left)
            .iter()
            .map(|o| o.correction)
            .sum()
    }
}
