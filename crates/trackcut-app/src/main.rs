//! TrackCut - headless timeline editor.
//!
//! Builds a session from the command line, applies the requested trims and
//! offsets, optionally plays the timeline for a while, then exports through
//! the manifest transcoder.

mod cli;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use trackcut_core::EditorConfig;
use trackcut_media::{
    add_probed_clip, ExportCancel, ExportPlan, Exporter, FileDownloadSink, FixedProbe, ManifestTranscoder,
};
use trackcut_timeline::{ClipSource, EditorSession, LayoutPolicy};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = cli::Args::parse();
    let config = load_config(args.config.as_deref())?;
    info!(mode = %args.mode, clips = args.clips.len(), "TrackCut starting");

    let mut session = EditorSession::new(args.mode, config)?;
    session.set_container_width(args.width);

    let mut probe = FixedProbe::new();
    for clip in &args.clips {
        probe.insert(uri_for(&clip.name), clip.duration);
    }

    for clip in &args.clips {
        let source = ClipSource::new(&clip.name, uri_for(&clip.name), args.mode.media_kind());
        let id = add_probed_clip(&mut session, &probe, source)
            .await
            .with_context(|| format!("Failed to add {}", clip.name))?;

        if let Some((start, end)) = clip.trim {
            session
                .set_trim_region(id, start, end)
                .with_context(|| format!("Failed to trim {}", clip.name))?;
        }
        if let Some(offset) = clip.offset {
            if args.mode.layout() == LayoutPolicy::Free {
                let axis = session.track().axis();
                let current = session.track().clip(id).map_or(0.0, |c| c.timeline_start);
                session.move_clip(id, axis.to_pixels(offset - current))?;
            } else {
                info!(clip = %clip.name, "Ignoring offset in a sequential editor");
            }
        }
    }

    let track = session.track();
    info!(
        total = track.total_duration(),
        axis = %track.axis(),
        "Timeline ready"
    );
    for entry in session.export_list() {
        info!(
            clip = %entry.source.name,
            lane = entry.lane,
            trim_start = entry.trim_start,
            trim_end = entry.trim_end,
            timeline_start = entry.timeline_start,
            "Edit"
        );
    }
    let ruler: Vec<String> = session.track().ruler().iter().map(|t| t.label()).collect();
    debug!(ticks = ?ruler, "Ruler");

    if let Some(seconds) = args.play {
        if session.play() {
            tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
            session.pause();
            let state = session.playback_state();
            info!(
                playhead = state.playhead_seconds,
                active = ?state.active_clip_id,
                "Playback paused"
            );
        } else {
            info!("Nothing to play");
        }
    }

    let plan = ExportPlan::for_session(&session)?;
    let exporter = Exporter::new(ManifestTranscoder);
    let sink = FileDownloadSink::new(&args.out);
    let delivered = exporter
        .export_to(&plan, &ExportCancel::new(), &sink, |p| {
            info!(stage = ?p.stage, percent = p.fraction() * 100.0, "Export progress")
        })
        .await?;
    info!(outputs = delivered, dir = %args.out.display(), "Export delivered");

    session.shutdown();
    Ok(())
}

fn uri_for(name: &str) -> String {
    format!("file:{}", name)
}

/// Explicit path, then the per-user config file, then defaults.
fn load_config(explicit: Option<&std::path::Path>) -> Result<EditorConfig> {
    if let Some(path) = explicit {
        return EditorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }
    match user_config_path() {
        Some(path) if path.exists() => {
            info!(path = %path.display(), "Loading user config");
            EditorConfig::load_from_file(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        _ => Ok(EditorConfig::default()),
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("trackcut").join("config.json"))
}
