//! Error types for the media edge.

use thiserror::Error;
use trackcut_core::TrackCutError;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Metadata probe failed: {0}")]
    ProbeFailed(String),

    #[error("Transcode failed: {0}")]
    TranscodeFailed(String),

    #[error("An export is already running for this track")]
    ExportInProgress,

    #[error("Export cancelled")]
    ExportCancelled,

    #[error("Nothing to export")]
    EmptyExport,

    /// Every other export failure; the cause is logged, not returned.
    #[error("Export failed")]
    ExportFailed,

    #[error(transparent)]
    Core(#[from] TrackCutError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MediaError>;
