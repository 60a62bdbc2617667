//! Integration tests for timeline playback.
//!
//! Runs sessions on a paused tokio clock so timer ticks are deterministic.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use trackcut_core::EditorConfig;
use trackcut_timeline::{ClipSource, EditorMode, EditorSession, MediaElement, MediaKind};

// ── Helpers ────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Element {
    playing: bool,
    visible: bool,
    time: f64,
}

/// Media element that records what the clock asks of it.
#[derive(Debug, Default)]
struct RecordingMedia {
    state: Mutex<Element>,
}

impl RecordingMedia {
    fn snapshot(&self) -> (bool, bool, f64) {
        let s = self.state.lock();
        (s.playing, s.visible, s.time)
    }
}

impl MediaElement for RecordingMedia {
    fn play(&self) {
        self.state.lock().playing = true;
    }

    fn pause(&self) {
        self.state.lock().playing = false;
    }

    fn seek_to(&self, seconds: f64) {
        self.state.lock().time = seconds;
    }

    fn set_visible(&self, visible: bool) {
        self.state.lock().visible = visible;
    }

    fn current_time(&self) -> f64 {
        self.state.lock().time
    }

    fn duration(&self) -> f64 {
        f64::INFINITY
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }
}

fn source(name: &str) -> ClipSource {
    ClipSource::new(name, format!("blob:{name}"), MediaKind::Audio)
}

fn session(mode: EditorMode) -> EditorSession {
    let mut session = EditorSession::new(mode, EditorConfig::default()).unwrap();
    session.set_container_width(1000.0);
    session
}

fn playhead(session: &EditorSession) -> f64 {
    session.playback_state().playhead_seconds
}

// ── Transport ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn playhead_is_monotonic_and_bounded() {
    let mut session = session(EditorMode::AudioJoin);
    session.add_clip(source("a.mp3"), 1.0).unwrap();
    session.add_clip(source("b.mp3"), 1.0).unwrap();
    let total = session.track().total_duration();

    assert!(session.play());
    let mut last = 0.0;
    for _ in 0..30 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let now = playhead(&session);
        assert!(now >= last);
        assert!(now <= total);
        last = now;
    }

    let state = session.playback_state();
    assert!(!state.is_playing);
    assert_eq!(state.playhead_seconds, total);
    assert_eq!(state.active_clip_id, None);
}

#[tokio::test(start_paused = true)]
async fn pause_stops_the_timer() {
    let mut session = session(EditorMode::AudioJoin);
    session.add_clip(source("a.mp3"), 5.0).unwrap();

    assert!(session.play());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(session.pause());
    let paused_at = playhead(&session);
    assert!(paused_at > 0.0);
    assert!(!session.is_ticking());

    // well past two tick intervals
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(playhead(&session), paused_at);
    assert!(!session.playback_state().is_playing);
}

#[tokio::test(start_paused = true)]
async fn play_without_clips_is_refused() {
    let mut session = session(EditorMode::AudioJoin);
    assert!(!session.play());
    assert!(!session.is_ticking());
}

#[tokio::test(start_paused = true)]
async fn adding_a_clip_resets_playback() {
    let mut session = session(EditorMode::AudioJoin);
    session.add_clip(source("a.mp3"), 5.0).unwrap();
    assert!(session.play());
    tokio::time::sleep(Duration::from_millis(300)).await;

    session.add_clip(source("b.mp3"), 5.0).unwrap();
    let state = session.playback_state();
    assert!(!state.is_playing);
    assert_eq!(state.playhead_seconds, 0.0);
    assert!(!session.is_ticking());
}

#[tokio::test(start_paused = true)]
async fn seeking_clamps_into_the_track() {
    let mut session = session(EditorMode::AudioJoin);
    session.add_clip(source("a.mp3"), 15.0).unwrap();

    assert_eq!(session.seek_forward(), 10.0);
    assert_eq!(session.seek_forward(), 15.0);
    assert_eq!(session.seek_backward(), 5.0);
    assert_eq!(session.seek_to(-3.0), 0.0);
}

// ── Activation ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn exclusive_editor_plays_one_clip_at_a_time() {
    let mut session = session(EditorMode::AudioJoin);
    let a = session.add_clip(source("a.mp3"), 4.0).unwrap();
    let b = session.add_clip(source("b.mp3"), 4.0).unwrap();
    let media_a = Arc::new(RecordingMedia::default());
    let media_b = Arc::new(RecordingMedia::default());
    session.mount_media(a, media_a.clone()).unwrap();
    session.mount_media(b, media_b.clone()).unwrap();

    session.seek_to(5.0);
    assert_eq!(session.playback_state().active_clip_id, Some(b));
    let (_, visible, time) = media_b.snapshot();
    assert!(visible);
    assert!((time - 1.0).abs() < 1e-9);

    session.seek_to(1.0);
    assert_eq!(session.playback_state().active_clip_id, Some(a));
    // the outgoing clip is parked
    assert_eq!(media_b.snapshot(), (false, false, 0.0));

    assert!(session.play());
    assert!(media_a.snapshot().0);
    assert!(!media_b.snapshot().0);

    session.pause();
    assert!(!media_a.snapshot().0);
}

#[tokio::test(start_paused = true)]
async fn multi_channel_editor_plays_overlapping_clips_together() {
    let mut session = session(EditorMode::MultiChannel);
    let a = session.add_clip(source("drums.mp3"), 4.0).unwrap();
    let b = session.add_clip(source("bass.mp3"), 2.0).unwrap();
    let media_a = Arc::new(RecordingMedia::default());
    let media_b = Arc::new(RecordingMedia::default());
    session.mount_media(a, media_a.clone()).unwrap();
    session.mount_media(b, media_b.clone()).unwrap();

    assert!(session.play());
    assert!(media_a.snapshot().0);
    assert!(media_b.snapshot().0);

    // b ends at 2 s, a keeps going
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert!(media_a.snapshot().0);
    assert_eq!(media_b.snapshot(), (false, false, 0.0));
    assert_eq!(session.playback_state().active_clip_id, Some(a));
}

#[tokio::test(start_paused = true)]
async fn trimmed_clip_plays_from_its_trim_start() {
    let mut session = session(EditorMode::AudioJoin);
    let a = session.add_clip(source("a.mp3"), 10.0).unwrap();
    let media = Arc::new(RecordingMedia::default());
    session.mount_media(a, media.clone()).unwrap();
    session.set_trim_region(a, 2.0, 8.0).unwrap();

    session.seek_to(1.0);
    let (_, visible, time) = media.snapshot();
    assert!(visible);
    assert!((time - 3.0).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn moving_a_playing_clip_reseeks_its_media() {
    // 1000 px over 4 s at 0.8 padding: 200 px/s
    let mut session = session(EditorMode::VideoJoin);
    let a = session.add_clip(source("a.mp3"), 4.0).unwrap();
    let media = Arc::new(RecordingMedia::default());
    session.mount_media(a, media.clone()).unwrap();

    assert!(session.play());
    tokio::time::sleep(Duration::from_secs(1)).await;
    let pixels = session.track().axis().to_pixels(0.5);
    assert!(session.move_clip(a, pixels).unwrap().is_some());

    let now = playhead(&session);
    let (playing, _, time) = media.snapshot();
    assert!(playing);
    assert_eq!(session.playback_state().active_clip_id, Some(a));
    assert!((time - (now - 0.5)).abs() < 1e-6);
    assert!(time > 0.0);
}

#[tokio::test(start_paused = true)]
async fn clips_without_media_still_play() {
    let mut session = session(EditorMode::AudioJoin);
    let a = session.add_clip(source("a.mp3"), 2.0).unwrap();
    session.add_clip(source("b.mp3"), 2.0).unwrap();
    session.mount_media(a, Arc::new(RecordingMedia::default())).unwrap();

    // b has no media at all; playback still runs over both clips
    assert!(session.play());
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(playhead(&session), 4.0);
}
