//! TrackCut Media - Collaborators at the edge of the timeline
//!
//! This crate handles:
//! - The transcoder, metadata probe and download interfaces
//! - Output file naming
//! - Single-flight export with progress and cancellation

pub mod download;
pub mod error;
pub mod export;
pub mod naming;
pub mod probe;
pub mod transcode;

pub use download::{DownloadSink, FileDownloadSink, MemoryDownloadSink};
pub use error::{MediaError, Result};
pub use export::{ExportCancel, ExportKind, ExportPlan, ExportProgress, ExportStage, Exporter};
pub use probe::{add_probed_clip, FixedProbe, MediaMetadata, MetadataProbe};
pub use transcode::{ManifestTranscoder, TranscodeOutput, TranscodeSegment, Transcoder};
