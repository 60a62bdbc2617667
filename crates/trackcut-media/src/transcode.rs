//! The transcoding service boundary.
//!
//! Cutting, concatenating and mixing media happen outside this workspace. The
//! [`Transcoder`] trait is the contract; [`ManifestTranscoder`] is a dry run
//! that describes the work as JSON instead of doing it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trackcut_timeline::{ClipSource, ExportEntry, MediaKind};

use crate::error::{MediaError, Result};
use crate::naming;

/// One input of a join or mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscodeSegment {
    pub source: ClipSource,
    /// Trim start in source seconds
    pub start: f64,
    /// Trim end in source seconds
    pub end: f64,
    /// Offset from the start of the output, for mixing
    pub delay_ms: u64,
}

impl TranscodeSegment {
    pub fn from_entry(entry: &ExportEntry) -> Self {
        Self {
            source: entry.source.clone(),
            start: entry.trim_start,
            end: entry.trim_end,
            delay_ms: delay_ms(entry.timeline_start),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Millisecond delay for a timeline start in seconds.
pub fn delay_ms(timeline_start: f64) -> u64 {
    if timeline_start.is_finite() && timeline_start > 0.0 {
        (timeline_start * 1000.0).round() as u64
    } else {
        0
    }
}

/// Encoded result of one transcoder call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeOutput {
    pub data: Vec<u8>,
    pub name: String,
}

/// Asynchronous transcoding service.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Cut `[start, end)` out of one source.
    async fn cut(&self, source: &ClipSource, start: f64, end: f64) -> Result<TranscodeOutput>;

    /// Concatenate segments in order.
    async fn join(&self, segments: &[TranscodeSegment]) -> Result<TranscodeOutput>;

    /// Overlay segments, each delayed by its `delay_ms`.
    async fn mix(&self, segments: &[TranscodeSegment]) -> Result<TranscodeOutput>;
}

#[derive(Serialize)]
struct Manifest<'a> {
    operation: &'static str,
    output: &'a str,
    segments: &'a [TranscodeSegment],
}

/// Transcoder that emits a JSON description of each request as its output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestTranscoder;

impl ManifestTranscoder {
    fn render(operation: &'static str, name: String, segments: &[TranscodeSegment]) -> Result<TranscodeOutput> {
        let manifest = Manifest {
            operation,
            output: &name,
            segments,
        };
        let data = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| MediaError::TranscodeFailed(format!("Failed to encode manifest: {}", e)))?;
        Ok(TranscodeOutput { data, name })
    }
}

#[async_trait]
impl Transcoder for ManifestTranscoder {
    async fn cut(&self, source: &ClipSource, start: f64, end: f64) -> Result<TranscodeOutput> {
        if !(start >= 0.0 && end > start) {
            return Err(MediaError::TranscodeFailed(format!(
                "invalid cut range {}..{}",
                start, end
            )));
        }
        let segment = TranscodeSegment {
            source: source.clone(),
            start,
            end,
            delay_ms: 0,
        };
        Self::render("cut", naming::cut_name(source), std::slice::from_ref(&segment))
    }

    async fn join(&self, segments: &[TranscodeSegment]) -> Result<TranscodeOutput> {
        let kind = segments.first().map_or(MediaKind::Audio, |s| s.source.kind);
        Self::render("join", naming::join_name(kind).to_string(), segments)
    }

    async fn mix(&self, segments: &[TranscodeSegment]) -> Result<TranscodeOutput> {
        Self::render("mix", naming::MIX_NAME.to_string(), segments)
    }
}
