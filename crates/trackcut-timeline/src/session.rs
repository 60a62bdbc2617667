//! Editor sessions.
//!
//! A session is one editor page: a track, the clock playing it and the event
//! bus both publish on. Every edit goes through the session so the clock's
//! schedule never lags behind the track.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use trackcut_core::{EditorConfig, Result, TrackCutError};
use tracing::info;
use uuid::Uuid;

use crate::clip::{Clip, ClipSource, MediaKind};
use crate::clock::{ActivationMode, MediaElement, PlaybackState, TickPlan, TimelineClock};
use crate::drag::{DragRelease, DragSession, GestureHandle, PointerButton};
use crate::events::{EventBus, TimelineEvent};
use crate::guard::ExportGuard;
use crate::playback::ClockDriver;
use crate::track::{ExportEntry, LayoutPolicy, TrackModel};
use crate::trim::{TrimChange, TrimHandle};

/// The five editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorMode {
    AudioCut,
    VideoCut,
    AudioJoin,
    VideoJoin,
    MultiChannel,
}

impl EditorMode {
    pub const ALL: [EditorMode; 5] = [
        EditorMode::AudioCut,
        EditorMode::VideoCut,
        EditorMode::AudioJoin,
        EditorMode::VideoJoin,
        EditorMode::MultiChannel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EditorMode::AudioCut => "audio-cut",
            EditorMode::VideoCut => "video-cut",
            EditorMode::AudioJoin => "audio-join",
            EditorMode::VideoJoin => "video-join",
            EditorMode::MultiChannel => "multi-channel",
        }
    }

    pub fn layout(self) -> LayoutPolicy {
        match self {
            EditorMode::VideoJoin | EditorMode::MultiChannel => LayoutPolicy::Free,
            EditorMode::AudioCut | EditorMode::VideoCut | EditorMode::AudioJoin => LayoutPolicy::Sequential,
        }
    }

    pub fn activation(self) -> ActivationMode {
        match self {
            EditorMode::MultiChannel => ActivationMode::Concurrent,
            _ => ActivationMode::Exclusive,
        }
    }

    pub fn media_kind(self) -> MediaKind {
        match self {
            EditorMode::VideoCut | EditorMode::VideoJoin => MediaKind::Video,
            _ => MediaKind::Audio,
        }
    }

    pub fn is_cut(self) -> bool {
        matches!(self, EditorMode::AudioCut | EditorMode::VideoCut)
    }

    /// Fit factor for this editor's axis.
    pub fn scale_padding(self, config: &EditorConfig) -> f64 {
        match self {
            EditorMode::MultiChannel => config.multi_lane_scale_padding,
            _ => config.scale_padding,
        }
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EditorMode {
    type Err = TrackCutError;

    fn from_str(s: &str) -> Result<Self> {
        EditorMode::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| TrackCutError::InvalidParameter(format!("unknown editor mode: {}", s)))
    }
}

/// A track and the clock that plays it.
pub struct EditorSession {
    mode: EditorMode,
    track: TrackModel,
    driver: ClockDriver,
}

impl EditorSession {
    /// Create a session bound to the current tokio runtime.
    pub fn new(mode: EditorMode, config: EditorConfig) -> Result<Self> {
        let events = EventBus::new();
        let padding = mode.scale_padding(&config);
        let track = TrackModel::new(config, mode.layout())?
            .with_events(events.clone())
            .with_scale_padding(padding);
        let clock = TimelineClock::new(mode.activation()).with_events(events);
        let driver = ClockDriver::new(clock)?;
        info!(mode = mode.name(), "Editor session created");
        Ok(Self { mode, track, driver })
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn track(&self) -> &TrackModel {
        &self.track
    }

    pub fn subscribe(&self) -> crossbeam_channel::Receiver<TimelineEvent> {
        self.track.events().subscribe()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.driver.playback_state()
    }

    pub fn is_ticking(&self) -> bool {
        self.driver.is_ticking()
    }

    pub fn export_guard(&self) -> &ExportGuard {
        self.track.export_guard()
    }

    // ── Composition ─────────────────────────────────────────────

    pub fn set_container_width(&mut self, width: f64) {
        self.track.set_container_width(width);
    }

    /// Add a clip. The multi-channel editor gives each clip its own lane.
    pub fn add_clip(&mut self, source: ClipSource, natural_duration: f64) -> Result<Uuid> {
        let id = match self.mode {
            EditorMode::MultiChannel => {
                // one past the highest lane still occupied
                let lane = self.track.clips().iter().map(|c| c.lane + 1).max().unwrap_or(0);
                self.track.add_clip_on_lane(source, natural_duration, lane)?.id
            }
            _ => self.track.add_clip(source, natural_duration)?.id,
        };
        self.restructure();
        Ok(id)
    }

    pub fn remove_clip(&mut self, id: Uuid) -> Result<Clip> {
        let clip = self.track.remove_clip(id)?;
        self.restructure();
        Ok(clip)
    }

    pub fn reorder_clip(&mut self, id: Uuid, new_index: usize) -> Result<()> {
        self.track.reorder_clip(id, new_index)?;
        self.restructure();
        Ok(())
    }

    pub fn mount_media(&mut self, id: Uuid, media: Arc<dyn MediaElement>) -> Result<()> {
        self.track.mount_media(id, media)?;
        self.sync();
        Ok(())
    }

    // ── Edits ───────────────────────────────────────────────────

    pub fn move_clip(&mut self, id: Uuid, pixel_delta: f64) -> Result<Option<f64>> {
        let moved = self.track.move_clip(id, pixel_delta)?;
        if moved.is_some() {
            self.sync();
        }
        Ok(moved)
    }

    pub fn trim_clip(&mut self, id: Uuid, handle: TrimHandle, pixel_delta: f64) -> Result<Option<TrimChange>> {
        let change = self.track.trim_clip(id, handle, pixel_delta)?;
        if change.is_some() {
            self.sync();
        }
        Ok(change)
    }

    pub fn set_trim_region(&mut self, id: Uuid, start: f64, end: f64) -> Result<Option<TrimChange>> {
        let change = self.track.set_trim_region(id, start, end)?;
        if change.is_some() {
            self.sync();
        }
        Ok(change)
    }

    pub fn pointer_down(
        &mut self,
        id: Uuid,
        button: PointerButton,
        client_x: f64,
        handle: Option<GestureHandle>,
    ) -> Result<bool> {
        self.track.pointer_down(id, button, client_x, handle)
    }

    pub fn pointer_move(&mut self, client_x: f64) -> Option<f64> {
        let delta = self.track.pointer_move(client_x);
        if delta.is_some() {
            self.sync();
        }
        delta
    }

    pub fn pointer_up(&mut self, client_x: f64) -> Result<Option<DragRelease>> {
        let release = self.track.pointer_up(client_x)?;
        if release.is_some() {
            self.sync();
        }
        Ok(release)
    }

    pub fn pointer_cancel(&mut self) -> Option<DragSession> {
        let session = self.track.pointer_cancel();
        if session.is_some() {
            self.sync();
        }
        session
    }

    // ── Transport ───────────────────────────────────────────────

    /// Start playback. Returns `false` if there is nothing to play.
    pub fn play(&mut self) -> bool {
        let config = self.track.config();
        let Some(plan) = TickPlan::from_axis(self.track.axis(), config.grid_unit_px, config.min_tick_interval())
        else {
            return false;
        };
        self.driver.play(plan)
    }

    pub fn pause(&mut self) -> bool {
        self.driver.pause()
    }

    /// Play when paused, pause when playing. Returns whether playback is running.
    pub fn toggle_playback(&mut self) -> bool {
        if self.playback_state().is_playing {
            self.pause();
            false
        } else {
            self.play()
        }
    }

    pub fn seek_to(&mut self, seconds: f64) -> f64 {
        self.driver.seek_to(seconds)
    }

    pub fn seek_forward(&mut self) -> f64 {
        self.driver.seek_by(self.track.config().seek_step)
    }

    pub fn seek_backward(&mut self) -> f64 {
        self.driver.seek_by(-self.track.config().seek_step)
    }

    /// Seek to the time under a click on the timeline.
    pub fn click_to_seek(&mut self, pixel_x: f64) -> f64 {
        let seconds = self.track.seconds_at(pixel_x);
        self.driver.seek_to(seconds)
    }

    /// Pixel column of the playhead line.
    pub fn playhead_pixel(&self) -> f64 {
        self.track.playhead_pixel(self.playback_state().playhead_seconds)
    }

    pub fn export_list(&self) -> Vec<ExportEntry> {
        self.track.to_export_list()
    }

    /// Stop the timer for good.
    pub fn shutdown(&mut self) {
        self.driver.shutdown();
    }

    fn sync(&mut self) {
        self.driver.update_schedule(self.track.schedule());
    }

    fn restructure(&mut self) {
        self.driver.reset(self.track.schedule());
    }
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("mode", &self.mode)
            .field("track", &self.track)
            .field("playback", &self.playback_state())
            .finish()
    }
}
