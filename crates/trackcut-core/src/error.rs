//! Error types for TrackCut.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for TrackCut operations.
///
/// Numeric edge cases of continuous pointer input (clamped drags, rejected
/// trims, zero durations) are never errors; they resolve to no-ops. Only
/// structural misuse surfaces here.
#[derive(Error, Debug)]
pub enum TrackCutError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Clip not found: {0}")]
    ClipNotFound(Uuid),

    #[error("{operation} is not available in the {layout} layout")]
    UnsupportedLayout {
        layout: &'static str,
        operation: &'static str,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for TrackCut operations.
pub type Result<T> = std::result::Result<T, TrackCutError>;
