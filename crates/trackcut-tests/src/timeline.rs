//! Integration tests for track editing.
//!
//! Exercises sessions, gestures and the edit list across trackcut-core and
//! trackcut-timeline.

use trackcut_core::{EditorConfig, TrackCutError};
use trackcut_timeline::{
    ClipSource, EditorMode, EditorSession, GestureHandle, LayoutPolicy, MediaKind, PointerButton, TimelineEvent,
    TrackModel, TrimHandle,
};
use uuid::Uuid;

// ── Helpers ────────────────────────────────────────────────────

fn audio(name: &str) -> ClipSource {
    ClipSource::new(name, format!("blob:{name}"), MediaKind::Audio)
}

fn video(name: &str) -> ClipSource {
    ClipSource::new(name, format!("blob:{name}"), MediaKind::Video)
}

fn session(mode: EditorMode, width: f64) -> EditorSession {
    let mut session = EditorSession::new(mode, EditorConfig::default()).unwrap();
    session.set_container_width(width);
    session
}

fn start_of(session: &EditorSession, id: Uuid) -> f64 {
    session.track().clip(id).unwrap().timeline_start
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

/// Pixel delta that moves `id` to `target` seconds on the current axis.
fn delta_to(session: &EditorSession, id: Uuid, target: f64) -> f64 {
    session.track().axis().to_pixels(target - start_of(session, id))
}

// ── Sequential join ────────────────────────────────────────────

#[tokio::test]
async fn trimmed_join_packs_clips_back_to_back() {
    let mut session = session(EditorMode::AudioJoin, 1000.0);
    let a = session.add_clip(audio("a.mp3"), 10.0).unwrap();
    let b = session.add_clip(audio("b.mp3"), 5.0).unwrap();

    session.set_trim_region(a, 2.0, 8.0).unwrap();

    let list = session.export_list();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].clip_id, a);
    assert_eq!((list[0].trim_start, list[0].trim_end, list[0].timeline_start), (2.0, 8.0, 0.0));
    assert_eq!(list[1].clip_id, b);
    assert_eq!((list[1].trim_start, list[1].trim_end, list[1].timeline_start), (0.0, 5.0, 6.0));
    assert!(close(session.track().total_duration(), 11.0));
}

#[tokio::test]
async fn right_handle_drag_trims_and_reflows() {
    // 1000 px over 10 s at 0.8 padding: 80 px/s
    let mut session = session(EditorMode::AudioJoin, 1000.0);
    let a = session.add_clip(audio("a.mp3"), 6.0).unwrap();
    let b = session.add_clip(audio("b.mp3"), 4.0).unwrap();
    assert!(close(session.track().axis().pixels_per_second(), 80.0));

    let right = session.track().clip_box(a).unwrap().right();
    assert!(session
        .pointer_down(a, PointerButton::Primary, right, Some(GestureHandle::Right))
        .unwrap());
    session.pointer_move(right - 80.0);
    // live resize already reflows the next clip
    assert!(close(start_of(&session, b), 5.0));
    let release = session.pointer_up(right - 160.0).unwrap().unwrap();
    assert_eq!(release.delta, -160.0);

    let clip = session.track().clip(a).unwrap();
    assert!(close(clip.trim.end(), 4.0));
    assert!(!clip.trim.is_resizing());
    assert!(close(start_of(&session, b), 4.0));
}

#[tokio::test]
async fn cancelled_trim_restores_region() {
    let mut session = session(EditorMode::AudioCut, 1000.0);
    let a = session.add_clip(audio("a.mp3"), 10.0).unwrap();
    let left = session.track().clip_box(a).unwrap().left();

    session
        .pointer_down(a, PointerButton::Primary, left, Some(GestureHandle::Left))
        .unwrap();
    session.pointer_move(left + 160.0);
    assert!(close(session.track().clip(a).unwrap().trim.start(), 2.0));

    session.pointer_cancel().unwrap();
    let clip = session.track().clip(a).unwrap();
    assert_eq!((clip.trim.start(), clip.trim.end()), (0.0, 10.0));
    assert!(!session.track().is_gesture_active());
}

#[tokio::test]
async fn trim_never_shrinks_below_minimum() {
    let mut session = session(EditorMode::AudioCut, 1000.0);
    let a = session.add_clip(audio("a.mp3"), 10.0).unwrap();

    session.trim_clip(a, TrimHandle::Right, -10_000.0).unwrap();
    let min = EditorConfig::default().min_clip_length;
    let trim = &session.track().clip(a).unwrap().trim;
    assert!(trim.duration() >= min - 1e-9);
    assert!(trim.start() >= 0.0 && trim.end() <= trim.natural_duration());
}

#[tokio::test]
async fn sequential_editors_refuse_moves() {
    let mut session = session(EditorMode::AudioJoin, 1000.0);
    let a = session.add_clip(audio("a.mp3"), 3.0).unwrap();

    let err = session.move_clip(a, 40.0).unwrap_err();
    assert!(matches!(err, TrackCutError::UnsupportedLayout { .. }));
    assert!(session
        .pointer_down(a, PointerButton::Primary, 10.0, Some(GestureHandle::Move))
        .is_err());
}

#[tokio::test]
async fn reorder_changes_play_order() {
    let mut session = session(EditorMode::AudioJoin, 1000.0);
    let a = session.add_clip(audio("a.mp3"), 3.0).unwrap();
    let b = session.add_clip(audio("b.mp3"), 2.0).unwrap();

    session.reorder_clip(b, 0).unwrap();
    let list = session.export_list();
    assert_eq!(list[0].clip_id, b);
    assert_eq!(list[1].clip_id, a);
    assert!(close(list[1].timeline_start, 2.0));
}

// ── Free layout ────────────────────────────────────────────────

#[tokio::test]
async fn contained_drop_exits_through_nearer_edge() {
    let mut session = session(EditorMode::VideoJoin, 1200.0);
    let a = session.add_clip(video("a.mp4"), 10.0).unwrap();
    let b = session.add_clip(video("b.mp4"), 2.0).unwrap();
    assert!(close(start_of(&session, b), 10.0));

    // open a gap first, then drop b inside a close to its right edge
    session.move_clip(b, delta_to(&session, b, 12.5)).unwrap();
    assert!(close(start_of(&session, b), 12.5));
    let moved = session.move_clip(b, delta_to(&session, b, 7.5)).unwrap();

    assert!(moved.is_some());
    assert!(close(start_of(&session, b), 10.0));
    let a_end = session.track().clip(a).unwrap().timeline_end();
    assert!(start_of(&session, b) >= a_end - 1e-6);
}

#[tokio::test]
async fn contained_drop_near_track_start_exits_right() {
    let mut session = session(EditorMode::VideoJoin, 1200.0);
    let a = session.add_clip(video("a.mp4"), 10.0).unwrap();
    let b = session.add_clip(video("b.mp4"), 2.0).unwrap();
    session.move_clip(b, delta_to(&session, b, 12.5)).unwrap();

    // [1, 3) inside [0, 10): the left edge is nearer but leads past zero
    let moved = session.move_clip(b, delta_to(&session, b, 1.0)).unwrap();

    assert!(moved.is_some());
    assert!(close(start_of(&session, b), 10.0));
    let a_end = session.track().clip(a).unwrap().timeline_end();
    assert!(start_of(&session, b) >= a_end - 1e-6);
    assert_eq!(start_of(&session, a), 0.0);
}

#[tokio::test]
async fn drag_offsets_do_not_carry_between_clips() {
    // 1200 px over 4 s at 0.8 padding: 240 px/s
    let mut session = session(EditorMode::VideoJoin, 1200.0);
    let a = session.add_clip(video("a.mp4"), 2.0).unwrap();
    let b = session.add_clip(video("b.mp4"), 2.0).unwrap();

    let x = session.track().clip_box(b).unwrap().x + 50.0;
    session
        .pointer_down(b, PointerButton::Primary, x, Some(GestureHandle::Move))
        .unwrap();
    let first = session.pointer_up(x + 120.0).unwrap().unwrap();
    assert_eq!(first.delta, 120.0);
    assert_eq!(first.offset, first.delta);
    assert!(close(start_of(&session, b), 2.5));

    session
        .pointer_down(a, PointerButton::Primary, 10.0, Some(GestureHandle::Move))
        .unwrap();
    let second = session.pointer_up(40.0).unwrap().unwrap();
    assert_eq!(second.delta, 30.0);
    assert_eq!(second.offset, second.delta);
    assert!(start_of(&session, a) > 0.0);
}

#[tokio::test]
async fn zero_delta_drag_changes_nothing() {
    let mut session = session(EditorMode::VideoJoin, 1200.0);
    let _a = session.add_clip(video("a.mp4"), 4.0).unwrap();
    let b = session.add_clip(video("b.mp4"), 4.0).unwrap();
    let before = session.export_list();
    let events = session.subscribe();

    let x = session.track().clip_box(b).unwrap().x + 50.0;
    assert!(session
        .pointer_down(b, PointerButton::Primary, x, Some(GestureHandle::Move))
        .unwrap());
    let release = session.pointer_up(x).unwrap().unwrap();

    assert_eq!(release.delta, 0.0);
    assert_eq!(session.export_list(), before);
    assert!(events
        .try_iter()
        .all(|e| !matches!(e, TimelineEvent::ClipMoved { .. })));
}

#[tokio::test]
async fn secondary_button_is_ignored() {
    let mut session = session(EditorMode::VideoJoin, 1200.0);
    let a = session.add_clip(video("a.mp4"), 4.0).unwrap();

    let started = session
        .pointer_down(a, PointerButton::Secondary, 10.0, Some(GestureHandle::Move))
        .unwrap();
    assert!(!started);
    assert!(session.pointer_up(200.0).unwrap().is_none());
    assert_eq!(start_of(&session, a), 0.0);
}

#[tokio::test]
async fn export_is_sorted_after_reverse_drag() {
    // 1200 px over 4 s at 0.8 padding: 240 px/s
    let mut session = session(EditorMode::VideoJoin, 1200.0);
    let a = session.add_clip(video("a.mp4"), 2.0).unwrap();
    let b = session.add_clip(video("b.mp4"), 2.0).unwrap();
    assert!(close(session.track().axis().pixels_per_second(), 240.0));

    // clamped to the container at 3 s, then pushed clear of b
    session.move_clip(a, 10_000.0).unwrap();
    assert!(close(start_of(&session, a), 4.0));

    let list = session.export_list();
    assert_eq!(list[0].clip_id, b);
    assert_eq!(list[1].clip_id, a);
    assert!(list.windows(2).all(|w| w[0].timeline_start <= w[1].timeline_start));
}

#[tokio::test]
async fn drag_preview_follows_pointer_until_release() {
    let mut session = session(EditorMode::VideoJoin, 1200.0);
    let a = session.add_clip(video("a.mp4"), 2.0).unwrap();
    let _b = session.add_clip(video("b.mp4"), 2.0).unwrap();
    let origin = session.track().clip_box(a).unwrap();

    session
        .pointer_down(a, PointerButton::Primary, 20.0, Some(GestureHandle::Move))
        .unwrap();
    session.pointer_move(60.0);
    let preview = session.track().gesture_preview().unwrap();
    assert_eq!(preview.x, origin.x + 40.0);
    // moves apply on release only
    assert_eq!(start_of(&session, a), 0.0);

    session.pointer_cancel().unwrap();
    assert_eq!(start_of(&session, a), 0.0);
    assert!(session.track().gesture_preview().is_none());
}

#[tokio::test]
async fn multi_channel_clips_get_their_own_lanes() {
    let mut session = session(EditorMode::MultiChannel, 1000.0);
    let a = session.add_clip(audio("drums.mp3"), 8.0).unwrap();
    let b = session.add_clip(audio("bass.mp3"), 6.0).unwrap();

    assert_eq!(session.track().clip(a).unwrap().lane, 0);
    assert_eq!(session.track().clip(b).unwrap().lane, 1);
    assert_eq!(start_of(&session, b), 0.0);
    // lanes do not collide
    session.move_clip(b, 80.0).unwrap();
    assert!(start_of(&session, b) > 0.0);
    assert!(start_of(&session, b) < 8.0);
}

#[tokio::test]
async fn multi_channel_lane_is_not_reused_after_removal() {
    let mut session = session(EditorMode::MultiChannel, 1000.0);
    let x = session.add_clip(audio("x.mp3"), 4.0).unwrap();
    let y = session.add_clip(audio("y.mp3"), 4.0).unwrap();
    session.remove_clip(x).unwrap();
    let z = session.add_clip(audio("z.mp3"), 4.0).unwrap();

    let lane_y = session.track().clip(y).unwrap().lane;
    let lane_z = session.track().clip(z).unwrap().lane;
    assert_ne!(lane_y, lane_z);
    // z has its lane to itself, so it starts at zero
    assert_eq!(start_of(&session, z), 0.0);
}

// ── Views ──────────────────────────────────────────────────────

#[test]
fn ruler_covers_padded_duration() {
    let mut track = TrackModel::new(EditorConfig::default(), LayoutPolicy::Sequential).unwrap();
    track.set_container_width(1000.0);
    track.add_clip(audio("a.mp3"), 10.0).unwrap();

    // 80 px/s with 80 px units: one tick per second over 11 s
    let ticks = track.ruler();
    assert_eq!(ticks.len(), 11);
    assert_eq!(ticks[0].label(), "0");
    assert_eq!(ticks[5].label(), "00:00:05");
}

#[test]
fn removing_last_clip_empties_axis() {
    let mut track = TrackModel::new(EditorConfig::default(), LayoutPolicy::Sequential).unwrap();
    track.set_container_width(1000.0);
    let id = track.add_clip(audio("a.mp3"), 10.0).unwrap().id;

    track.remove_clip(id).unwrap();
    assert!(track.is_empty());
    assert!(track.axis().is_empty());
    assert_eq!(track.total_duration(), 0.0);
    assert!(matches!(track.remove_clip(id), Err(TrackCutError::ClipNotFound(_))));
}
