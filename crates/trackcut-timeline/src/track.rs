//! The track aggregate.
//!
//! A `TrackModel` owns every clip on one timeline together with the state that
//! ties pixels to seconds: the container width and the derived [`TimeAxis`].
//! Gestures arrive in pixels, pass through the drag controller and collision
//! resolver, and land on the clips as seconds.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use trackcut_core::{
    ruler_ticks, thumbnail_times, EditorConfig, Rect, Result, RulerTick, TimeAxis, TrackCutError,
};
use tracing::debug;
use uuid::Uuid;

use crate::clip::{Clip, ClipSource};
use crate::clock::{MediaElement, ScheduledClip};
use crate::collision::CollisionResolver;
use crate::drag::{DragBounds, DragController, DragRelease, DragSession, GestureHandle, PointerButton};
use crate::events::{EventBus, TimelineEvent};
use crate::guard::ExportGuard;
use crate::trim::{TrimChange, TrimHandle};

/// Offsets closer than this are treated as unchanged.
const POSITION_EPSILON: f64 = 1e-9;

/// How clip positions are decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutPolicy {
    /// Clips play back to back in list order; positions are derived.
    Sequential,
    /// Clips are placed freely by dragging; lanes keep rows apart.
    Free,
}

impl LayoutPolicy {
    pub fn name(self) -> &'static str {
        match self {
            LayoutPolicy::Sequential => "sequential",
            LayoutPolicy::Free => "free",
        }
    }
}

/// One row of the edit list handed to the transcoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub clip_id: Uuid,
    pub source: ClipSource,
    pub trim_start: f64,
    pub trim_end: f64,
    pub timeline_start: f64,
    pub lane: usize,
}

impl ExportEntry {
    pub fn duration(&self) -> f64 {
        self.trim_end - self.trim_start
    }
}

/// The gesture in flight.
#[derive(Debug, Clone, Copy)]
struct GestureTarget {
    clip_id: Uuid,
    /// Timeline start when the gesture began
    origin_start: f64,
    /// Scale at pointer-down; live resizes rescale the track under the pointer
    axis: TimeAxis,
}

/// Clips on one timeline plus the scale they are drawn at.
pub struct TrackModel {
    config: EditorConfig,
    layout: LayoutPolicy,
    scale_padding: f64,
    /// Insertion order; sequential playback order
    clips: Vec<Clip>,
    media: HashMap<Uuid, Arc<dyn MediaElement>>,
    container_width: f64,
    axis: TimeAxis,
    total: f64,
    resolver: CollisionResolver,
    drag: DragController,
    gesture: Option<GestureTarget>,
    events: EventBus,
    export_guard: ExportGuard,
}

impl std::fmt::Debug for TrackModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackModel")
            .field("layout", &self.layout)
            .field("clips", &self.clips)
            .field("mounted_media", &self.media.len())
            .field("container_width", &self.container_width)
            .field("axis", &self.axis)
            .field("total", &self.total)
            .finish()
    }
}

impl TrackModel {
    /// Create an empty track.
    pub fn new(config: EditorConfig, layout: LayoutPolicy) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scale_padding: config.scale_padding,
            resolver: CollisionResolver::new(config.collision_gutter_px),
            config,
            layout,
            clips: Vec::new(),
            media: HashMap::new(),
            container_width: 0.0,
            axis: TimeAxis::EMPTY,
            total: 0.0,
            drag: DragController::new(),
            gesture: None,
            events: EventBus::new(),
            export_guard: ExportGuard::new(),
        })
    }

    /// Publish on a shared bus instead of a private one.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Override the fit factor used for the axis.
    pub fn with_scale_padding(mut self, padding: f64) -> Self {
        if padding.is_finite() && padding > 0.0 {
            self.scale_padding = padding;
        }
        self.refresh_scale();
        self
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn layout(&self) -> LayoutPolicy {
        self.layout
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn axis(&self) -> TimeAxis {
        self.axis
    }

    /// Shared by every export taken from this track.
    pub fn export_guard(&self) -> &ExportGuard {
        &self.export_guard
    }

    pub fn container_width(&self) -> f64 {
        self.container_width
    }

    /// Latest end over all clips.
    pub fn total_duration(&self) -> f64 {
        self.total
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clip(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Pixel box of a clip on the current axis.
    pub fn clip_box(&self, id: Uuid) -> Option<Rect> {
        self.clip(id).map(|c| c.bounds(self.axis))
    }

    // ── Composition ─────────────────────────────────────────────

    /// Resize the container the track is drawn in.
    pub fn set_container_width(&mut self, width: f64) {
        self.container_width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        self.refresh_scale();
    }

    /// Append a clip on lane 0 after the current last clip.
    pub fn add_clip(&mut self, source: ClipSource, natural_duration: f64) -> Result<&Clip> {
        self.insert_clip(source, natural_duration, 0)
    }

    /// Append a clip on its own lane. Free layout only.
    pub fn add_clip_on_lane(&mut self, source: ClipSource, natural_duration: f64, lane: usize) -> Result<&Clip> {
        self.require_free("add_clip_on_lane")?;
        self.insert_clip(source, natural_duration, lane)
    }

    fn insert_clip(&mut self, source: ClipSource, natural_duration: f64, lane: usize) -> Result<&Clip> {
        let mut clip = Clip::new(source, natural_duration, self.config.min_clip_length)?;
        clip.lane = lane;
        clip.timeline_start = match self.layout {
            LayoutPolicy::Sequential => self.total,
            LayoutPolicy::Free => self
                .clips
                .iter()
                .filter(|c| c.lane == lane)
                .map(Clip::timeline_end)
                .fold(0.0, f64::max),
        };
        let id = clip.id;
        debug!(clip = %id, name = %clip.source.name, start = clip.timeline_start, lane, "Clip added");
        self.clips.push(clip);
        self.events.publish(TimelineEvent::ClipAdded { clip_id: id });
        self.refresh_scale();

        let index = self.clips.len() - 1;
        Ok(&self.clips[index])
    }

    /// Remove a clip, releasing its source and media.
    pub fn remove_clip(&mut self, id: Uuid) -> Result<Clip> {
        let index = self.index_of(id)?;
        if self.gesture.is_some_and(|g| g.clip_id == id) {
            self.drag.pointer_cancel();
            self.gesture = None;
        }
        let clip = self.clips.remove(index);
        self.media.remove(&id);
        debug!(clip = %id, "Clip removed");
        self.events.publish(TimelineEvent::ClipRemoved { clip_id: id });
        self.relayout();
        self.refresh_scale();
        Ok(clip)
    }

    /// Move a clip to `new_index` in the play order. Sequential layout only.
    pub fn reorder_clip(&mut self, id: Uuid, new_index: usize) -> Result<()> {
        if self.layout != LayoutPolicy::Sequential {
            return Err(self.unsupported("reorder_clip"));
        }
        let index = self.index_of(id)?;
        let clip = self.clips.remove(index);
        let new_index = new_index.min(self.clips.len());
        self.clips.insert(new_index, clip);
        debug!(clip = %id, from = index, to = new_index, "Clip reordered");
        self.relayout();
        Ok(())
    }

    /// Hand a clip its media element. The track keeps the only strong reference.
    pub fn mount_media(&mut self, id: Uuid, media: Arc<dyn MediaElement>) -> Result<()> {
        self.index_of(id)?;
        self.media.insert(id, media);
        Ok(())
    }

    pub fn unmount_media(&mut self, id: Uuid) -> Option<Arc<dyn MediaElement>> {
        self.media.remove(&id)
    }

    // ── Edits ───────────────────────────────────────────────────

    /// Drag a clip horizontally by `pixel_delta`. Free layout only.
    ///
    /// The delta is clamped to the container, then corrected against
    /// overlapping clips on the same lane. Returns the new timeline start, or
    /// `None` if the clip did not move.
    pub fn move_clip(&mut self, id: Uuid, pixel_delta: f64) -> Result<Option<f64>> {
        self.require_free("move_clip")?;
        let index = self.index_of(id)?;
        if pixel_delta == 0.0 || !pixel_delta.is_finite() || self.axis.is_empty() {
            return Ok(None);
        }

        let current = self.clips[index].bounds(self.axis);
        let bounds = if self.container_width > 0.0 {
            DragBounds::within_parent(current.x, current.width, self.container_width)
        } else {
            DragBounds::UNBOUNDED
        };
        let candidate = current.translate_x(bounds.clamp(pixel_delta));

        let siblings: Vec<Rect> = self
            .clips
            .iter()
            .filter(|c| c.id != id)
            .map(|c| c.bounds(self.axis))
            .collect();
        // never pushed past the track start; such pushes exit on the right
        let correction = self.resolver.resolve_within(candidate, &siblings, 0.0);
        let resolved_x = (candidate.x + correction).max(0.0);
        let new_start = self.axis.to_seconds(resolved_x).max(0.0);

        let clip = &mut self.clips[index];
        if (new_start - clip.timeline_start).abs() < POSITION_EPSILON {
            return Ok(None);
        }
        clip.timeline_start = new_start;
        debug!(clip = %id, start = new_start, correction, "Clip moved");
        self.events.publish(TimelineEvent::ClipMoved {
            clip_id: id,
            timeline_start: new_start,
        });
        self.refresh_scale();
        Ok(Some(new_start))
    }

    /// Pull one trim handle of a clip by `pixel_delta`.
    ///
    /// In the sequential layout every later clip follows the new duration. In
    /// the free layout a left trim keeps the clip's right edge in place.
    pub fn trim_clip(&mut self, id: Uuid, handle: TrimHandle, pixel_delta: f64) -> Result<Option<TrimChange>> {
        let index = self.index_of(id)?;
        let origin_start = self.clips[index].timeline_start;
        let resizing = self.clips[index].trim.is_resizing();
        if !resizing {
            self.clips[index].trim.begin();
        }
        let change = self.resize_at(index, handle, pixel_delta, origin_start, self.axis);
        if !resizing {
            self.clips[index].trim.commit();
        }
        Ok(change)
    }

    /// Set a clip's trim window directly, as the waveform region does.
    pub fn set_trim_region(&mut self, id: Uuid, start: f64, end: f64) -> Result<Option<TrimChange>> {
        let index = self.index_of(id)?;
        let Some(change) = self.clips[index].trim.set_region(start, end) else {
            return Ok(None);
        };
        self.after_trim(index, change);
        Ok(Some(change))
    }

    fn resize_at(
        &mut self,
        index: usize,
        handle: TrimHandle,
        pixel_delta: f64,
        origin_start: f64,
        axis: TimeAxis,
    ) -> Option<TrimChange> {
        let shifts_start = self.layout == LayoutPolicy::Free && handle == TrimHandle::Left;
        let clip = &mut self.clips[index];

        let change = clip.trim.preview(handle, pixel_delta, &axis)?;
        if shifts_start {
            let (anchor_start, _) = clip.trim.anchor();
            let start = origin_start + (change.start - anchor_start);
            if start < -POSITION_EPSILON {
                return None;
            }
            clip.trim.resize(handle, pixel_delta, &axis)?;
            clip.timeline_start = start.max(0.0);
        } else {
            clip.trim.resize(handle, pixel_delta, &axis)?;
        }
        self.after_trim(index, change);
        Some(change)
    }

    fn after_trim(&mut self, index: usize, change: TrimChange) {
        let id = self.clips[index].id;
        debug!(clip = %id, start = change.start, end = change.end, "Trim changed");
        self.events.publish(TimelineEvent::TrimChanged {
            clip_id: id,
            start: change.start,
            end: change.end,
            duration: change.duration,
        });
        self.relayout();
        self.refresh_scale();
    }

    // ── Gestures ────────────────────────────────────────────────

    /// Which part of a clip sits under pixel `x`.
    pub fn hit_test(&self, id: Uuid, x: f64) -> Option<GestureHandle> {
        let rect = self.clip_box(id)?;
        if x < rect.left() || x > rect.right() || rect.width <= 0.0 {
            return None;
        }
        let handle_width = self.config.handle_width_px.min(rect.width / 2.0);
        if x <= rect.left() + handle_width {
            Some(GestureHandle::Left)
        } else if x >= rect.right() - handle_width {
            Some(GestureHandle::Right)
        } else {
            Some(GestureHandle::Move)
        }
    }

    /// Begin a gesture on a clip. Returns `false` if the press is ignored.
    ///
    /// Moving clips requires the free layout.
    pub fn pointer_down(
        &mut self,
        id: Uuid,
        button: PointerButton,
        client_x: f64,
        handle: Option<GestureHandle>,
    ) -> Result<bool> {
        let index = self.index_of(id)?;
        if handle == Some(GestureHandle::Move) {
            self.require_free("move_clip")?;
        }
        let clip = &self.clips[index];
        let bounds = match handle {
            Some(GestureHandle::Move) if self.container_width > 0.0 => {
                let rect = clip.bounds(self.axis);
                DragBounds::within_parent(rect.x, rect.width, self.container_width)
            }
            _ => DragBounds::UNBOUNDED,
        };
        let origin_start = clip.timeline_start;
        if self.gesture.is_none() {
            // offsets are per gesture; the clip's own start is the resting position
            self.drag.set_offset(0.0);
        }
        if !self.drag.pointer_down(button, client_x, handle, bounds) {
            return Ok(false);
        }
        if let Some(trim_handle) = handle.and_then(GestureHandle::trim_handle) {
            debug!(clip = %id, handle = ?trim_handle, "Resize started");
            self.clips[index].trim.begin();
        }
        self.gesture = Some(GestureTarget {
            clip_id: id,
            origin_start,
            axis: self.axis,
        });
        Ok(true)
    }

    /// Track the pointer. Resizes apply live; moves only update the preview.
    ///
    /// Returns the clamped pixel delta of the gesture.
    pub fn pointer_move(&mut self, client_x: f64) -> Option<f64> {
        let target = self.gesture?;
        let delta = self.drag.pointer_move(client_x)?;
        let handle = self.drag.session()?.handle;
        if let Some(trim_handle) = handle.trim_handle() {
            if let Ok(index) = self.index_of(target.clip_id) {
                self.resize_at(index, trim_handle, delta, target.origin_start, target.axis);
            }
        }
        Some(delta)
    }

    /// Box the dragged clip would occupy if released now.
    pub fn gesture_preview(&self) -> Option<Rect> {
        let target = self.gesture?;
        let session = self.drag.session()?;
        let rect = self.clip_box(target.clip_id)?;
        match session.handle {
            GestureHandle::Move => Some(rect.translate_x(self.drag.live_offset() - session.origin_offset)),
            _ => Some(rect),
        }
    }

    /// Finish the gesture wherever the pointer is released.
    pub fn pointer_up(&mut self, client_x: f64) -> Result<Option<DragRelease>> {
        let Some(target) = self.gesture.take() else {
            return Ok(None);
        };
        let Some(release) = self.drag.pointer_up(client_x) else {
            return Ok(None);
        };
        match release.handle.trim_handle() {
            Some(trim_handle) => {
                let index = self.index_of(target.clip_id)?;
                self.resize_at(index, trim_handle, release.delta, target.origin_start, target.axis);
                self.clips[index].trim.commit();
            }
            None => {
                self.move_clip(target.clip_id, release.delta)?;
            }
        }
        Ok(Some(release))
    }

    /// Abandon the gesture and restore the clip as it was at pointer-down.
    pub fn pointer_cancel(&mut self) -> Option<DragSession> {
        let target = self.gesture.take()?;
        let session = self.drag.pointer_cancel()?;
        if session.handle.trim_handle().is_some() {
            if let Ok(index) = self.index_of(target.clip_id) {
                let clip = &mut self.clips[index];
                if let Some(change) = clip.trim.cancel() {
                    clip.timeline_start = target.origin_start;
                    self.after_trim(index, change);
                }
            }
        }
        debug!(clip = %target.clip_id, "Gesture cancelled");
        Some(session)
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    // ── Views ───────────────────────────────────────────────────

    /// Clips as the clock sees them, ordered by timeline start.
    pub fn schedule(&self) -> Vec<ScheduledClip> {
        let mut schedule: Vec<ScheduledClip> = self
            .clips
            .iter()
            .map(|c| {
                let scheduled = ScheduledClip::new(c.id, c.timeline_start, c.timeline_duration())
                    .with_source_offset(c.trim.start());
                match self.media.get(&c.id) {
                    Some(media) => scheduled.with_media(media),
                    None => scheduled,
                }
            })
            .collect();
        schedule.sort_by(|a, b| a.start.total_cmp(&b.start));
        schedule
    }

    /// Final edit list, ascending by timeline start; ties keep insertion order.
    pub fn to_export_list(&self) -> Vec<ExportEntry> {
        let mut entries: Vec<ExportEntry> = self
            .clips
            .iter()
            .map(|c| ExportEntry {
                clip_id: c.id,
                source: c.source.clone(),
                trim_start: c.trim.start(),
                trim_end: c.trim.end(),
                timeline_start: c.timeline_start,
                lane: c.lane,
            })
            .collect();
        entries.sort_by(|a, b| a.timeline_start.total_cmp(&b.timeline_start));
        entries
    }

    /// Ruler ticks over the padded track duration.
    pub fn ruler(&self) -> Vec<RulerTick> {
        ruler_ticks(
            self.axis,
            self.total * self.config.duration_padding,
            self.config.grid_unit_px,
        )
    }

    /// Source times for a clip's strip thumbnails.
    pub fn thumbnail_plan(&self, id: Uuid) -> Result<Vec<f64>> {
        let clip = self.clip(id).ok_or(TrackCutError::ClipNotFound(id))?;
        Ok(thumbnail_times(
            self.axis,
            clip.trim.natural_duration(),
            self.config.thumbnail_size_px,
        ))
    }

    /// Timeline time under pixel `x`, clamped into the track.
    pub fn seconds_at(&self, x: f64) -> f64 {
        self.axis.to_seconds(x).clamp(0.0, self.total)
    }

    /// Pixel column of the playhead line.
    pub fn playhead_pixel(&self, playhead: f64) -> f64 {
        self.axis.to_pixels(playhead.clamp(0.0, self.total)).floor()
    }

    // ── Internals ───────────────────────────────────────────────

    fn index_of(&self, id: Uuid) -> Result<usize> {
        self.clips
            .iter()
            .position(|c| c.id == id)
            .ok_or(TrackCutError::ClipNotFound(id))
    }

    fn require_free(&self, operation: &'static str) -> Result<()> {
        match self.layout {
            LayoutPolicy::Free => Ok(()),
            LayoutPolicy::Sequential => Err(self.unsupported(operation)),
        }
    }

    fn unsupported(&self, operation: &'static str) -> TrackCutError {
        TrackCutError::UnsupportedLayout {
            layout: self.layout.name(),
            operation,
        }
    }

    /// Pack a sequential track back to back in list order.
    fn relayout(&mut self) {
        if self.layout != LayoutPolicy::Sequential {
            return;
        }
        let mut cursor = 0.0;
        for clip in &mut self.clips {
            if (clip.timeline_start - cursor).abs() >= POSITION_EPSILON {
                clip.timeline_start = cursor;
                self.events.publish(TimelineEvent::ClipMoved {
                    clip_id: clip.id,
                    timeline_start: cursor,
                });
            }
            cursor += clip.timeline_duration();
        }
    }

    /// Recompute the total duration and the axis derived from it.
    fn refresh_scale(&mut self) {
        let total = self.clips.iter().map(Clip::timeline_end).fold(0.0, f64::max);
        if total != self.total {
            self.total = total;
            self.events.publish(TimelineEvent::DurationChanged { total });
        }
        let axis = TimeAxis::fit(self.container_width, self.total, self.scale_padding);
        if axis != self.axis {
            self.axis = axis;
            self.events.publish(TimelineEvent::AxisChanged {
                pixels_per_second: axis.pixels_per_second(),
            });
        }
    }
}
