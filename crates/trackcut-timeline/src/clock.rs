//! The timeline clock.
//!
//! One logical playhead advances over every clip on the track. The clock owns
//! no media: clips are handed in as a schedule holding weak references to their
//! media elements, and the clock decides on every tick which of them should be
//! playing. A released element is skipped, never fatal.
//!
//! The clock itself is synchronous; [`crate::playback::ClockDriver`] calls
//! [`TimelineClock::tick`] from a timer task.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use trackcut_core::TimeAxis;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::events::{EventBus, TimelineEvent};

/// Upper bound on the tick interval for very coarse scales.
const MAX_TICK_INTERVAL: Duration = Duration::from_millis(250);

// ── Media capability ────────────────────────────────────────────

/// Playback surface of a waveform widget or video element.
///
/// Methods take `&self`; implementations hold their own interior state.
pub trait MediaElement: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn seek_to(&self, seconds: f64);
    /// Show or hide the element. Audio-only surfaces ignore this.
    fn set_visible(&self, _visible: bool) {}
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn is_playing(&self) -> bool;
}

// ── Schedule ────────────────────────────────────────────────────

/// A clip as the clock sees it.
#[derive(Clone)]
pub struct ScheduledClip {
    pub id: Uuid,
    /// Timeline start in seconds
    pub start: f64,
    pub duration: f64,
    /// Media time at the clip's timeline start (its trim start)
    pub source_offset: f64,
    pub media: Option<Weak<dyn MediaElement>>,
}

impl ScheduledClip {
    pub fn new(id: Uuid, start: f64, duration: f64) -> Self {
        Self {
            id,
            start,
            duration,
            source_offset: 0.0,
            media: None,
        }
    }

    pub fn with_source_offset(mut self, offset: f64) -> Self {
        if offset.is_finite() {
            self.source_offset = offset.max(0.0);
        }
        self
    }

    /// Attach a borrowed media element.
    pub fn with_media(mut self, media: &Arc<dyn MediaElement>) -> Self {
        self.media = Some(Arc::downgrade(media));
        self
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Media position for timeline time `seconds`.
    pub fn media_time(&self, seconds: f64) -> f64 {
        seconds - self.start + self.source_offset
    }

    /// Closed-open interval test.
    pub fn contains(&self, seconds: f64) -> bool {
        seconds >= self.start && seconds < self.end()
    }
}

impl fmt::Debug for ScheduledClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledClip")
            .field("id", &self.id)
            .field("start", &self.start)
            .field("duration", &self.duration)
            .field("source_offset", &self.source_offset)
            .field("has_media", &self.media.is_some())
            .finish()
    }
}

/// How many clips may play at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationMode {
    /// First clip containing the playhead (joiners).
    Exclusive,
    /// Every clip containing the playhead (multi-channel mixing).
    Concurrent,
}

// ── Tick plan ───────────────────────────────────────────────────

/// Timer period and playhead step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickPlan {
    pub interval: Duration,
    /// Seconds added to the playhead per tick
    pub increment: f64,
}

impl TickPlan {
    /// Derive the plan from the pixel scale.
    ///
    /// One grid unit spans `grid_unit_px / pps` seconds; spreading it over the
    /// unit's pixels at the same scale gives a step of `1 / pps²` seconds. The
    /// timer fires once per step, so the playhead advances in real time. The
    /// period is clamped to `[min_interval, 250ms]` and the step follows it.
    pub fn from_axis(axis: TimeAxis, grid_unit_px: f64, min_interval: Duration) -> Option<Self> {
        if axis.is_empty() || !(grid_unit_px.is_finite() && grid_unit_px > 0.0) {
            return None;
        }
        let seconds_per_unit = axis.to_seconds(grid_unit_px);
        let step = seconds_per_unit / axis.pixels_per_second() / grid_unit_px;

        let floor = min_interval.max(Duration::from_millis(1)).as_secs_f64();
        let ceil = MAX_TICK_INTERVAL.as_secs_f64().max(floor);
        let step = step.max(floor).min(ceil);
        if !step.is_finite() {
            return None;
        }
        Some(Self::fixed(Duration::from_secs_f64(step)))
    }

    /// Real-time plan with an explicit period.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            increment: interval.as_secs_f64(),
        }
    }
}

// ── Clock ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockState {
    Stopped,
    Running,
}

/// Snapshot of the transport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub playhead_seconds: f64,
    pub active_clip_id: Option<Uuid>,
}

/// Whether the timer should keep firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Finished,
}

/// Single playhead over a schedule of clips.
#[derive(Debug)]
pub struct TimelineClock {
    mode: ActivationMode,
    schedule: Vec<ScheduledClip>,
    total: f64,
    playhead: f64,
    state: ClockState,
    increment: f64,
    active: SmallVec<[Uuid; 4]>,
    events: Option<EventBus>,
}

impl TimelineClock {
    pub fn new(mode: ActivationMode) -> Self {
        Self {
            mode,
            schedule: Vec::new(),
            total: 0.0,
            playhead: 0.0,
            state: ClockState::Stopped,
            increment: 0.0,
            active: SmallVec::new(),
            events: None,
        }
    }

    /// Publish transport events on `bus`.
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn mode(&self) -> ActivationMode {
        self.mode
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn total_duration(&self) -> f64 {
        self.total
    }

    /// Clips currently playing, in schedule order.
    pub fn active_clips(&self) -> &[Uuid] {
        &self.active
    }

    pub fn playback_state(&self) -> PlaybackState {
        PlaybackState {
            is_playing: self.is_running(),
            playhead_seconds: self.playhead,
            active_clip_id: self.active.first().copied(),
        }
    }

    /// Replace the schedule after a non-structural edit (trim, move).
    ///
    /// Active clips that disappeared are parked first. The playhead is clamped
    /// into the new total; a zero total stops the clock. Active clips whose
    /// start or trim moved are re-seeked.
    pub fn set_schedule(&mut self, mut schedule: Vec<ScheduledClip>) {
        schedule.sort_by(|a, b| a.start.total_cmp(&b.start));
        let shifted = self.active.iter().any(|id| {
            let before = self.schedule.iter().find(|c| c.id == *id);
            let after = schedule.iter().find(|c| c.id == *id);
            match (before, after) {
                (Some(b), Some(a)) => b.start != a.start || b.source_offset != a.source_offset,
                _ => false,
            }
        });

        let dropped: SmallVec<[Uuid; 4]> = self
            .active
            .iter()
            .filter(|id| !schedule.iter().any(|c| c.id == **id))
            .copied()
            .collect();
        for id in &dropped {
            self.with_media(*id, park);
        }
        self.active.retain(|id| !dropped.contains(id));

        self.schedule = schedule;
        self.total = total_of(&self.schedule);
        if self.playhead > self.total {
            self.playhead = self.total;
        }
        if self.total <= 0.0 && self.is_running() {
            self.stop();
        }
        self.evaluate(shifted);
    }

    /// Replace the schedule after a structural edit and return to `{stopped, 0, none}`.
    pub fn reset(&mut self, mut schedule: Vec<ScheduledClip>) {
        let active = std::mem::take(&mut self.active);
        for id in &active {
            self.with_media(*id, park);
        }
        let was_running = self.is_running();
        self.state = ClockState::Stopped;
        self.playhead = 0.0;

        schedule.sort_by(|a, b| a.start.total_cmp(&b.start));
        self.schedule = schedule;
        self.total = total_of(&self.schedule);

        debug!(clips = self.schedule.len(), total = self.total, "Clock reset");
        if was_running {
            self.publish(TimelineEvent::PlaybackStopped { playhead: 0.0 });
        }
        if !active.is_empty() {
            self.publish(TimelineEvent::ActiveClipsChanged { active: Vec::new() });
        }
        self.publish(TimelineEvent::PlayheadMoved { seconds: 0.0 });
    }

    /// Start running. A clock at the end rewinds first.
    ///
    /// Returns `false` when there is nothing to play.
    pub fn start(&mut self, plan: TickPlan) -> bool {
        if self.total <= 0.0 || !(plan.increment.is_finite() && plan.increment > 0.0) {
            return false;
        }
        self.increment = plan.increment;
        if self.is_running() {
            return true;
        }
        if self.playhead >= self.total {
            self.playhead = 0.0;
        }
        self.state = ClockState::Running;
        info!(playhead = self.playhead, total = self.total, "Playback started");
        self.publish(TimelineEvent::PlaybackStarted {
            playhead: self.playhead,
        });
        self.evaluate(true);
        true
    }

    /// Advance the playhead by one step.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Finished;
        }
        self.playhead = (self.playhead + self.increment).min(self.total);
        self.publish(TimelineEvent::PlayheadMoved {
            seconds: self.playhead,
        });

        if self.playhead >= self.total {
            self.state = ClockState::Stopped;
            self.evaluate(false);
            info!(playhead = self.playhead, "Playback reached the end");
            self.publish(TimelineEvent::PlaybackStopped {
                playhead: self.playhead,
            });
            return TickOutcome::Finished;
        }
        self.evaluate(false);
        TickOutcome::Continue
    }

    /// Stop running and pause whatever is playing.
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.stop();
        info!(playhead = self.playhead, "Playback paused");
        true
    }

    /// Jump to `seconds`, clamped into `[0, total]`.
    pub fn seek_to(&mut self, seconds: f64) -> f64 {
        if !seconds.is_finite() {
            return self.playhead;
        }
        self.playhead = seconds.clamp(0.0, self.total.max(0.0));
        self.publish(TimelineEvent::PlayheadMoved {
            seconds: self.playhead,
        });
        self.evaluate(true);
        self.playhead
    }

    /// Move the playhead by `delta` seconds.
    pub fn seek_by(&mut self, delta: f64) -> f64 {
        self.seek_to(self.playhead + delta)
    }

    fn stop(&mut self) {
        self.state = ClockState::Stopped;
        for id in self.active.clone() {
            self.with_media(id, |media| media.pause());
        }
        self.publish(TimelineEvent::PlaybackStopped {
            playhead: self.playhead,
        });
    }

    /// Bring media in line with the playhead.
    ///
    /// Outgoing clips are fully stopped before incoming ones start. With
    /// `reposition`, clips that stay active are re-seeked as well.
    fn evaluate(&mut self, reposition: bool) {
        let playhead = self.playhead;
        let targets: SmallVec<[Uuid; 4]> = match self.mode {
            ActivationMode::Exclusive => self
                .schedule
                .iter()
                .find(|c| c.contains(playhead))
                .map(|c| c.id)
                .into_iter()
                .collect(),
            ActivationMode::Concurrent => self
                .schedule
                .iter()
                .filter(|c| c.contains(playhead))
                .map(|c| c.id)
                .collect(),
        };
        let running = self.is_running();

        for id in self.active.iter().filter(|id| !targets.contains(id)) {
            self.with_media(*id, park);
        }

        for id in &targets {
            let Some(offset) = self
                .schedule
                .iter()
                .find(|c| c.id == *id)
                .map(|c| c.media_time(playhead))
            else {
                continue;
            };
            if !self.active.contains(id) {
                self.with_media(*id, |media| {
                    media.set_visible(true);
                    media.seek_to(offset);
                    if running {
                        media.play();
                    }
                });
            } else if reposition {
                self.with_media(*id, |media| {
                    media.seek_to(offset);
                    if running && !media.is_playing() {
                        media.play();
                    }
                });
            }
        }

        if self.active != targets {
            debug!(playhead, active = targets.len(), "Active clips changed");
            self.active = targets;
            self.publish(TimelineEvent::ActiveClipsChanged {
                active: self.active.to_vec(),
            });
        }
    }

    fn with_media(&self, id: Uuid, f: impl FnOnce(&dyn MediaElement)) {
        let Some(clip) = self.schedule.iter().find(|c| c.id == id) else {
            return;
        };
        match &clip.media {
            None => debug!(clip = %id, "No media mounted, skipping"),
            Some(weak) => match weak.upgrade() {
                Some(media) => f(media.as_ref()),
                None => warn!(clip = %id, playhead = self.playhead, "Media handle released, skipping"),
            },
        }
    }

    fn publish(&self, event: TimelineEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }
}

/// Pause, hide and rewind an element that leaves the playhead.
fn park(media: &dyn MediaElement) {
    media.pause();
    media.set_visible(false);
    media.seek_to(0.0);
}

fn total_of(schedule: &[ScheduledClip]) -> f64 {
    schedule.iter().map(ScheduledClip::end).fold(0.0, f64::max)
}
