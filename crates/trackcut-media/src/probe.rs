//! Media metadata probing.
//!
//! A clip cannot exist before its natural duration is known, so clip creation
//! goes through [`add_probed_clip`], which waits on the probe first.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trackcut_timeline::{ClipSource, EditorSession};
use uuid::Uuid;

use crate::error::{MediaError, Result};

/// What the probe reports about a source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub duration_seconds: f64,
}

/// Asynchronous metadata source, e.g. a media element's `loadedmetadata`.
#[async_trait]
pub trait MetadataProbe: Send + Sync {
    async fn probe(&self, source: &ClipSource) -> Result<MediaMetadata>;
}

/// Probe answering from a table of known durations, keyed by source URI.
#[derive(Debug, Clone, Default)]
pub struct FixedProbe {
    durations: HashMap<String, f64>,
}

impl FixedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, uri: impl Into<String>, duration_seconds: f64) -> Self {
        self.insert(uri, duration_seconds);
        self
    }

    pub fn insert(&mut self, uri: impl Into<String>, duration_seconds: f64) {
        self.durations.insert(uri.into(), duration_seconds);
    }
}

#[async_trait]
impl MetadataProbe for FixedProbe {
    async fn probe(&self, source: &ClipSource) -> Result<MediaMetadata> {
        self.durations
            .get(&source.uri)
            .map(|&duration_seconds| MediaMetadata { duration_seconds })
            .ok_or_else(|| MediaError::ProbeFailed(format!("no metadata for {}", source.uri)))
    }
}

/// Probe `source` and add it to the session once its duration is known.
pub async fn add_probed_clip(
    session: &mut EditorSession,
    probe: &dyn MetadataProbe,
    source: ClipSource,
) -> Result<Uuid> {
    let metadata = probe.probe(&source).await?;
    let duration = metadata.duration_seconds;
    if !(duration.is_finite() && duration > 0.0) {
        warn!(source = %source.name, duration, "Probe returned an unusable duration");
        return Err(MediaError::ProbeFailed(format!(
            "{} has no playable duration ({})",
            source.name, duration
        )));
    }
    debug!(source = %source.name, duration, "Metadata loaded");
    Ok(session.add_clip(source, duration)?)
}
