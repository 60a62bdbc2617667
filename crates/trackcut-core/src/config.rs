//! Editor tunables.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides. Unknown fields are ignored.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, TrackCutError};

/// Tunables shared by every editor mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Shortest trimmed clip length in seconds.
    pub min_clip_length: f64,
    /// Factor applied when fitting the track into the container.
    pub scale_padding: f64,
    /// Factor used in place of `scale_padding` for multi-lane editing.
    pub multi_lane_scale_padding: f64,
    /// Factor applied to the total duration when laying out the ruler.
    pub duration_padding: f64,
    /// Width of one ruler grid unit in pixels.
    pub grid_unit_px: f64,
    /// Lower bound on the clock tick interval, in milliseconds.
    pub min_tick_interval_ms: u64,
    /// Transport seek step in seconds.
    pub seek_step: f64,
    /// Extra pixels added to every collision correction.
    pub collision_gutter_px: f64,
    /// Width of a resize handle in pixels.
    pub handle_width_px: f64,
    /// Width of one strip thumbnail in pixels.
    pub thumbnail_size_px: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_clip_length: 0.1,
            scale_padding: 0.8,
            multi_lane_scale_padding: 0.9,
            duration_padding: 1.1,
            grid_unit_px: 80.0,
            min_tick_interval_ms: 4,
            seek_step: 10.0,
            collision_gutter_px: 0.0,
            handle_width_px: 6.0,
            thumbnail_size_px: 80.0,
        }
    }
}

impl EditorConfig {
    /// Minimum tick interval as a [`Duration`].
    pub fn min_tick_interval(&self) -> Duration {
        Duration::from_millis(self.min_tick_interval_ms.max(1))
    }

    /// Check that every tunable is usable.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("min_clip_length", self.min_clip_length),
            ("scale_padding", self.scale_padding),
            ("multi_lane_scale_padding", self.multi_lane_scale_padding),
            ("duration_padding", self.duration_padding),
            ("grid_unit_px", self.grid_unit_px),
            ("seek_step", self.seek_step),
            ("handle_width_px", self.handle_width_px),
            ("thumbnail_size_px", self.thumbnail_size_px),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TrackCutError::Configuration(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if !(self.collision_gutter_px.is_finite() && self.collision_gutter_px >= 0.0) {
            return Err(TrackCutError::Configuration(format!(
                "collision_gutter_px must not be negative, got {}",
                self.collision_gutter_px
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| TrackCutError::Serialization(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| TrackCutError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Load a config from a file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}
