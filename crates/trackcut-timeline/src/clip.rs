//! Clip types for the timeline.

use serde::{Deserialize, Serialize};
use trackcut_core::{Rect, Result, TimeAxis};
use uuid::Uuid;

use crate::trim::TrimRegion;

/// Kind of media a clip carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Audio,
    Video,
}

/// Reference to a media source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipSource {
    /// File name as selected by the user
    pub name: String,
    /// Location the transcoder reads from
    pub uri: String,
    pub kind: MediaKind,
}

impl ClipSource {
    /// Create a new source reference.
    pub fn new(name: impl Into<String>, uri: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            kind,
        }
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(dot) if dot > 0 => &self.name[..dot],
            _ => &self.name,
        }
    }
}

/// A clip on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: Uuid,
    /// Reference to source media
    pub source: ClipSource,
    /// Row the clip sits on; collisions only happen within a lane
    pub lane: usize,
    /// In/out points within the source
    pub trim: TrimRegion,
    /// Offset of the clip's first frame on the timeline, in seconds
    pub timeline_start: f64,
}

impl Clip {
    /// Create a clip covering its whole source.
    pub fn new(source: ClipSource, natural_duration: f64, min_length: f64) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            source,
            lane: 0,
            trim: TrimRegion::new(natural_duration, min_length)?,
            timeline_start: 0.0,
        })
    }

    /// Length of the clip on the timeline.
    pub fn timeline_duration(&self) -> f64 {
        self.trim.duration()
    }

    pub fn timeline_end(&self) -> f64 {
        self.timeline_start + self.timeline_duration()
    }

    /// Whether `seconds` falls inside `[timeline_start, timeline_end)`.
    pub fn contains(&self, seconds: f64) -> bool {
        seconds >= self.timeline_start && seconds < self.timeline_end()
    }

    /// Pixel box of this clip on the given axis.
    pub fn bounds(&self, axis: TimeAxis) -> Rect {
        Rect::on_lane(
            axis.to_pixels(self.timeline_start),
            axis.to_pixels(self.timeline_duration()),
            self.lane,
        )
    }
}
