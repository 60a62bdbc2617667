//! Pixel/time conversion for the timeline.
//!
//! Clips are positioned in seconds and drawn in pixels. `TimeAxis` is the only
//! place the two meet: gestures arrive as pixel deltas and leave as seconds.
//! An axis is a derived value, rebuilt whenever the container width or the
//! track duration changes, never mutated in place.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversion scale between pixel offsets and time offsets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeAxis {
    /// Pixels per second; zero means the axis is degenerate.
    pixels_per_second: f64,
}

impl TimeAxis {
    /// Degenerate axis: every conversion yields zero.
    pub const EMPTY: Self = Self {
        pixels_per_second: 0.0,
    };

    /// Create an axis with an explicit scale.
    ///
    /// Zero, negative or non-finite scales collapse to [`TimeAxis::EMPTY`].
    pub fn new(pixels_per_second: f64) -> Self {
        if pixels_per_second.is_finite() && pixels_per_second > 0.0 {
            Self { pixels_per_second }
        } else {
            Self::EMPTY
        }
    }

    /// Fit `total_duration` seconds into `container_width` pixels.
    ///
    /// `padding` scales the result (`0.8` leaves a fifth of the container free
    /// to drag clips past the current end). A zero duration yields the empty axis.
    pub fn fit(container_width: f64, total_duration: f64, padding: f64) -> Self {
        if !(total_duration.is_finite() && total_duration > 0.0) {
            return Self::EMPTY;
        }
        Self::new(container_width / total_duration * padding)
    }

    /// Scale of this axis.
    #[inline]
    pub fn pixels_per_second(self) -> f64 {
        self.pixels_per_second
    }

    /// Whether conversions on this axis are meaningful.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.pixels_per_second == 0.0
    }

    /// Convert a time offset to a pixel offset.
    #[inline]
    pub fn to_pixels(self, seconds: f64) -> f64 {
        if self.is_empty() || !seconds.is_finite() {
            return 0.0;
        }
        seconds * self.pixels_per_second
    }

    /// Convert a pixel offset to a time offset.
    #[inline]
    pub fn to_seconds(self, pixels: f64) -> f64 {
        if self.is_empty() || !pixels.is_finite() {
            return 0.0;
        }
        pixels / self.pixels_per_second
    }
}

impl fmt::Display for TimeAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} px/s", self.pixels_per_second)
    }
}

/// Format seconds as `HH:MM:SS`, flooring each component.
///
/// Negative and non-finite inputs format as zero.
pub fn format_timecode(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// A labelled tick on the timeline ruler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RulerTick {
    pub index: usize,
    /// Offset from the start of the timeline in pixels.
    pub pixel: f64,
    /// Time represented by this tick.
    pub seconds: f64,
}

impl RulerTick {
    /// Label drawn under the tick. The origin tick is a bare `0`.
    pub fn label(&self) -> String {
        if self.index == 0 {
            "0".to_string()
        } else {
            format_timecode(self.seconds)
        }
    }
}

/// Ruler ticks every `grid_unit_px` pixels covering `duration` seconds.
pub fn ruler_ticks(axis: TimeAxis, duration: f64, grid_unit_px: f64) -> Vec<RulerTick> {
    let step = axis.to_seconds(grid_unit_px);
    if step <= 0.0 || !(duration.is_finite() && duration > 0.0) {
        return Vec::new();
    }
    // Padding factors like 1.1 leave float noise above whole tick counts.
    let count = (duration / step - 1e-9).ceil() as usize;
    (0..count)
        .map(|index| RulerTick {
            index,
            pixel: grid_unit_px * index as f64,
            seconds: step * index as f64,
        })
        .collect()
}

/// Source times at which strip thumbnails are captured for a clip.
///
/// One thumbnail covers `frame_size_px` pixels of clip width, so the sampling
/// step in seconds is `frame_size_px / pixels_per_second`.
pub fn thumbnail_times(axis: TimeAxis, duration: f64, frame_size_px: f64) -> Vec<f64> {
    let step = axis.to_seconds(frame_size_px);
    if step <= 0.0 || !(duration.is_finite() && duration > 0.0) {
        return Vec::new();
    }
    let count = (duration / step).floor() as usize;
    (0..count).map(|i| step * i as f64).collect()
}
