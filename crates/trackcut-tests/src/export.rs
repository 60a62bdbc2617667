//! Integration tests for the export pipeline.
//!
//! Builds sessions, snapshots their edit lists and runs them through the
//! exporter with real and slow transcoders.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use trackcut_core::EditorConfig;
use trackcut_media::{
    add_probed_clip, ExportCancel, ExportKind, ExportPlan, Exporter, FixedProbe, ManifestTranscoder, MediaError,
    MemoryDownloadSink, TranscodeOutput, TranscodeSegment, Transcoder,
};
use trackcut_timeline::{ClipSource, EditorMode, EditorSession, MediaKind};

// ── Helpers ────────────────────────────────────────────────────

fn source(name: &str, kind: MediaKind) -> ClipSource {
    ClipSource::new(name, format!("blob:{name}"), kind)
}

fn session(mode: EditorMode) -> EditorSession {
    let mut session = EditorSession::new(mode, EditorConfig::default()).unwrap();
    session.set_container_width(1000.0);
    session
}

fn manifest(output: &TranscodeOutput) -> serde_json::Value {
    serde_json::from_slice(&output.data).unwrap()
}

/// Takes a second per call.
struct SlowTranscoder;

impl SlowTranscoder {
    async fn finish(name: &str) -> trackcut_media::Result<TranscodeOutput> {
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(TranscodeOutput {
            data: Vec::new(),
            name: name.to_string(),
        })
    }
}

#[async_trait]
impl Transcoder for SlowTranscoder {
    async fn cut(&self, source: &ClipSource, _start: f64, _end: f64) -> trackcut_media::Result<TranscodeOutput> {
        Self::finish(&source.name).await
    }

    async fn join(&self, _segments: &[TranscodeSegment]) -> trackcut_media::Result<TranscodeOutput> {
        Self::finish("join").await
    }

    async fn mix(&self, _segments: &[TranscodeSegment]) -> trackcut_media::Result<TranscodeOutput> {
        Self::finish("mix").await
    }
}

fn slow_plan() -> ExportPlan {
    ExportPlan {
        kind: ExportKind::Join,
        media: MediaKind::Audio,
        segments: vec![TranscodeSegment {
            source: source("a.mp3", MediaKind::Audio),
            start: 0.0,
            end: 1.0,
            delay_ms: 0,
        }],
        guard: None,
    }
}

// ── Session to output ──────────────────────────────────────────

#[tokio::test]
async fn join_manifest_follows_edit_list() {
    let mut session = session(EditorMode::AudioJoin);
    let probe = FixedProbe::new().with("blob:a.mp3", 10.0).with("blob:b.mp3", 5.0);
    let a = add_probed_clip(&mut session, &probe, source("a.mp3", MediaKind::Audio))
        .await
        .unwrap();
    add_probed_clip(&mut session, &probe, source("b.mp3", MediaKind::Audio))
        .await
        .unwrap();
    session.set_trim_region(a, 2.0, 8.0).unwrap();

    let plan = ExportPlan::for_session(&session).unwrap();
    assert_eq!(plan.kind, ExportKind::Join);
    assert_eq!(plan.step_count(), 1);

    let sink = MemoryDownloadSink::new();
    let exporter = Exporter::new(ManifestTranscoder);
    let delivered = exporter
        .export_to(&plan, &ExportCancel::new(), &sink, |_| {})
        .await
        .unwrap();
    assert_eq!(delivered, 1);

    let outputs = sink.outputs();
    assert_eq!(outputs[0].name, "media_join.mp3");
    let json = manifest(&outputs[0]);
    assert_eq!(json["segments"][0]["source"]["name"], "a.mp3");
    assert_eq!(json["segments"][0]["start"], 2.0);
    assert_eq!(json["segments"][0]["end"], 8.0);
    assert_eq!(json["segments"][1]["source"]["name"], "b.mp3");
}

#[tokio::test]
async fn cutter_exports_one_file_per_clip() {
    let mut session = session(EditorMode::VideoCut);
    session.add_clip(source("talk.mp4", MediaKind::Video), 30.0).unwrap();
    session.add_clip(source("intro.mp4", MediaKind::Video), 5.0).unwrap();

    let plan = ExportPlan::for_session(&session).unwrap();
    let outputs = Exporter::new(ManifestTranscoder)
        .export(&plan, &ExportCancel::new(), |_| {})
        .await
        .unwrap();
    let names: Vec<&str> = outputs.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["talk(media_video_cut).mp4", "intro(media_video_cut).mp4"]);
}

#[tokio::test]
async fn mix_carries_timeline_offsets_as_delays() {
    let mut session = session(EditorMode::MultiChannel);
    session.add_clip(source("drums.mp3", MediaKind::Audio), 8.0).unwrap();
    let bass = session.add_clip(source("bass.mp3", MediaKind::Audio), 4.0).unwrap();
    // 1000 px over 8 s at 0.9 padding: 112.5 px/s
    let moved = session.move_clip(bass, 112.5 * 1.5).unwrap();
    assert!(moved.is_some());

    let plan = ExportPlan::for_session(&session).unwrap();
    assert_eq!(plan.kind, ExportKind::Mix);
    let delays: Vec<u64> = plan.segments.iter().map(|s| s.delay_ms).collect();
    assert_eq!(delays, [0, 1500]);

    let outputs = Exporter::new(ManifestTranscoder)
        .export(&plan, &ExportCancel::new(), |_| {})
        .await
        .unwrap();
    assert_eq!(outputs[0].name, "media_mix.mp3");
    assert_eq!(manifest(&outputs[0])["segments"][1]["delay_ms"], 1500);
}

#[tokio::test]
async fn empty_session_has_nothing_to_export() {
    let session = session(EditorMode::AudioJoin);
    assert!(matches!(ExportPlan::for_session(&session), Err(MediaError::EmptyExport)));
}

// ── Concurrency ────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn second_export_is_rejected_while_running() {
    let exporter = Arc::new(Exporter::new(SlowTranscoder));
    let plan = slow_plan();

    let first = {
        let exporter = Arc::clone(&exporter);
        let plan = plan.clone();
        tokio::spawn(async move { exporter.export(&plan, &ExportCancel::new(), |_| {}).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(exporter.is_exporting());

    let err = exporter.export(&plan, &ExportCancel::new(), |_| {}).await.unwrap_err();
    assert!(matches!(err, MediaError::ExportInProgress));

    let outputs = first.await.unwrap().unwrap();
    assert_eq!(outputs.len(), 1);
    assert!(!exporter.is_exporting());

    // the flag is free again
    assert!(exporter.export(&plan, &ExportCancel::new(), |_| {}).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn one_export_per_session_across_exporters() {
    let mut session = session(EditorMode::AudioJoin);
    session.add_clip(source("a.mp3", MediaKind::Audio), 3.0).unwrap();
    let plan = ExportPlan::for_session(&session).unwrap();

    let first = {
        let plan = plan.clone();
        tokio::spawn(async move {
            Exporter::new(SlowTranscoder)
                .export(&plan, &ExportCancel::new(), |_| {})
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(session.export_guard().is_claimed());

    // a fresh exporter and a fresh snapshot of the same session are both refused
    let second = Exporter::new(SlowTranscoder);
    let fresh = ExportPlan::for_session(&session).unwrap();
    let err = second.export(&fresh, &ExportCancel::new(), |_| {}).await.unwrap_err();
    assert!(matches!(err, MediaError::ExportInProgress));
    assert!(!second.is_exporting());

    assert_eq!(first.await.unwrap().unwrap().len(), 1);
    assert!(!session.export_guard().is_claimed());
    assert!(second.export(&fresh, &ExportCancel::new(), |_| {}).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_a_running_export() {
    let exporter = Arc::new(Exporter::new(SlowTranscoder));
    let cancel = ExportCancel::new();

    let running = {
        let exporter = Arc::clone(&exporter);
        let cancel = cancel.clone();
        tokio::spawn(async move { exporter.export(&slow_plan(), &cancel, |_| {}).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();

    let err = running.await.unwrap().unwrap_err();
    assert!(matches!(err, MediaError::ExportCancelled));
    assert!(!exporter.is_exporting());
}
