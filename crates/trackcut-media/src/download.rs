//! Delivering finished exports.
//!
//! Delivery is fire-and-forget: a sink logs its own failures.

use std::path::PathBuf;

use parking_lot::Mutex;
use tracing::{error, info};

use crate::transcode::TranscodeOutput;

/// Destination for finished outputs.
pub trait DownloadSink: Send + Sync {
    fn deliver(&self, output: &TranscodeOutput);
}

/// Writes each output into a directory under its output name.
#[derive(Debug, Clone)]
pub struct FileDownloadSink {
    dir: PathBuf,
}

impl FileDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for FileDownloadSink {
    fn deliver(&self, output: &TranscodeOutput) {
        let path = self.dir.join(&output.name);
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            error!(dir = %self.dir.display(), error = %e, "Failed to create download directory");
            return;
        }
        match std::fs::write(&path, &output.data) {
            Ok(()) => info!(path = %path.display(), bytes = output.data.len(), "Output saved"),
            Err(e) => error!(path = %path.display(), error = %e, "Failed to save output"),
        }
    }
}

/// Keeps outputs in memory.
#[derive(Debug, Default)]
pub struct MemoryDownloadSink {
    outputs: Mutex<Vec<TranscodeOutput>>,
}

impl MemoryDownloadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outputs(&self) -> Vec<TranscodeOutput> {
        self.outputs.lock().clone()
    }
}

impl DownloadSink for MemoryDownloadSink {
    fn deliver(&self, output: &TranscodeOutput) {
        self.outputs.lock().push(output.clone());
    }
}
