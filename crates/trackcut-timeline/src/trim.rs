//! Trim boundaries for a single clip.
//!
//! A resize gesture moves one side of the `[start, end)` window. Candidates are
//! computed from the window captured when the gesture began, so a gesture that
//! wanders into an invalid position and back loses nothing. Invalid
//! candidates are dropped silently.

use serde::{Deserialize, Serialize};
use trackcut_core::{Result, TimeAxis, TrackCutError};

/// Snapping distance to the natural bounds, in seconds.
const BOUND_EPSILON: f64 = 1e-9;

/// Which side of the trim window a gesture moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrimHandle {
    Left,
    Right,
}

/// Result of an accepted trim update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimChange {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

/// Trim window `[start, end)` over a source of fixed length.
///
/// Always satisfies `0 <= start < end <= natural_duration` and
/// `end - start >= min_length` (the minimum is capped at the natural duration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimRegion {
    natural_duration: f64,
    start: f64,
    end: f64,
    min_length: f64,
    /// Window captured at gesture start.
    #[serde(skip)]
    anchor: Option<(f64, f64)>,
}

impl TrimRegion {
    /// Full-length region over a source of `natural_duration` seconds.
    pub fn new(natural_duration: f64, min_length: f64) -> Result<Self> {
        if !(natural_duration.is_finite() && natural_duration > 0.0) {
            return Err(TrackCutError::InvalidParameter(format!(
                "natural duration must be positive, got {}",
                natural_duration
            )));
        }
        if !(min_length.is_finite() && min_length > 0.0) {
            return Err(TrackCutError::InvalidParameter(format!(
                "minimum clip length must be positive, got {}",
                min_length
            )));
        }
        Ok(Self {
            natural_duration,
            start: 0.0,
            end: natural_duration,
            min_length: min_length.min(natural_duration),
            anchor: None,
        })
    }

    pub fn natural_duration(&self) -> f64 {
        self.natural_duration
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Trimmed length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn min_length(&self) -> f64 {
        self.min_length
    }

    /// Whether a resize gesture is in progress.
    pub fn is_resizing(&self) -> bool {
        self.anchor.is_some()
    }

    /// Window that resize candidates are computed from.
    pub fn anchor(&self) -> (f64, f64) {
        self.anchor.unwrap_or((self.start, self.end))
    }

    /// Capture the current window as the gesture origin.
    pub fn begin(&mut self) {
        self.anchor = Some((self.start, self.end));
    }

    /// End the gesture, keeping the current window.
    pub fn commit(&mut self) {
        self.anchor = None;
    }

    /// End the gesture, restoring the window captured by [`TrimRegion::begin`].
    ///
    /// Returns the restored window if it differs from the current one.
    pub fn cancel(&mut self) -> Option<TrimChange> {
        let (start, end) = self.anchor.take()?;
        if start == self.start && end == self.end {
            return None;
        }
        self.start = start;
        self.end = end;
        Some(self.change())
    }

    /// Candidate window for moving `handle` by `pixel_delta`, without applying it.
    pub fn preview(&self, handle: TrimHandle, pixel_delta: f64, axis: &TimeAxis) -> Option<TrimChange> {
        let (base_start, base_end) = self.anchor();
        let delta = axis.to_seconds(pixel_delta);
        let (start, end) = match handle {
            TrimHandle::Left => (base_start + delta, base_end),
            TrimHandle::Right => (base_start, base_end + delta),
        };
        self.validate(start, end)
    }

    /// Move one side of the window by a pixel delta measured from the gesture origin.
    ///
    /// Returns `None` when the candidate violates the bounds or leaves the
    /// window unchanged.
    pub fn resize(&mut self, handle: TrimHandle, pixel_delta: f64, axis: &TimeAxis) -> Option<TrimChange> {
        let change = self.preview(handle, pixel_delta, axis)?;
        self.apply(change)
    }

    /// Set both sides directly, as a waveform region update does.
    pub fn set_region(&mut self, start: f64, end: f64) -> Option<TrimChange> {
        let change = self.validate(start, end)?;
        self.apply(change)
    }

    fn apply(&mut self, change: TrimChange) -> Option<TrimChange> {
        if change.start == self.start && change.end == self.end {
            return None;
        }
        self.start = change.start;
        self.end = change.end;
        Some(change)
    }

    fn validate(&self, start: f64, end: f64) -> Option<TrimChange> {
        if !(start.is_finite() && end.is_finite()) {
            return None;
        }
        let start = if start.abs() < BOUND_EPSILON { 0.0 } else { start };
        let end = if (end - self.natural_duration).abs() < BOUND_EPSILON {
            self.natural_duration
        } else {
            end
        };
        if start < 0.0 || end > self.natural_duration || end - start < self.min_length {
            return None;
        }
        Some(TrimChange {
            start,
            end,
            duration: end - start,
        })
    }

    fn change(&self) -> TrimChange {
        TrimChange {
            start: self.start,
            end: self.end,
            duration: self.duration(),
        }
    }
}
