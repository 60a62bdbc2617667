//! Export pipeline.
//!
//! An export turns a track's edit list into transcoder calls: one cut per clip
//! for the cutters, a single join or mix otherwise. Only one export runs per
//! exporter, and per track, at a time. Each step races the cancel handle and
//! nothing is returned unless every step succeeded.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::{error, info, warn};
use trackcut_timeline::{EditorMode, EditorSession, ExportEntry, ExportGuard, MediaKind};

use crate::download::DownloadSink;
use crate::error::{MediaError, Result};
use crate::transcode::{TranscodeOutput, TranscodeSegment, Transcoder};

// ── Plan ────────────────────────────────────────────────────────

/// Transcoder operation an export maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportKind {
    /// One output per clip
    Cut,
    /// Clips back to back
    Join,
    /// Clips overlaid at their timeline offsets
    Mix,
}

impl ExportKind {
    pub fn for_mode(mode: EditorMode) -> Self {
        match mode {
            EditorMode::AudioCut | EditorMode::VideoCut => ExportKind::Cut,
            EditorMode::AudioJoin | EditorMode::VideoJoin => ExportKind::Join,
            EditorMode::MultiChannel => ExportKind::Mix,
        }
    }
}

/// Everything an export needs, detached from the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPlan {
    pub kind: ExportKind,
    pub media: MediaKind,
    /// In edit-list order
    pub segments: Vec<TranscodeSegment>,
    /// Guard of the track the plan was taken from
    #[serde(skip)]
    pub guard: Option<ExportGuard>,
}

impl ExportPlan {
    pub fn from_entries(kind: ExportKind, media: MediaKind, entries: &[ExportEntry]) -> Result<Self> {
        if entries.is_empty() {
            return Err(MediaError::EmptyExport);
        }
        Ok(Self {
            kind,
            media,
            segments: entries.iter().map(TranscodeSegment::from_entry).collect(),
            guard: None,
        })
    }

    /// Tie the plan to a track's export guard.
    pub fn with_guard(mut self, guard: &ExportGuard) -> Self {
        self.guard = Some(guard.clone());
        self
    }

    /// Snapshot a session's edit list.
    pub fn for_session(session: &EditorSession) -> Result<Self> {
        let mode = session.mode();
        Ok(Self::from_entries(ExportKind::for_mode(mode), mode.media_kind(), &session.export_list())?
            .with_guard(session.export_guard()))
    }

    /// Number of transcoder calls.
    pub fn step_count(&self) -> usize {
        match self.kind {
            ExportKind::Cut => self.segments.len(),
            ExportKind::Join | ExportKind::Mix => 1,
        }
    }
}

// ── Progress ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportStage {
    Cutting { index: usize, count: usize },
    Joining,
    Mixing,
    Done,
}

/// Export progress information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportProgress {
    pub stage: ExportStage,
    /// Transcoder calls finished so far.
    pub completed: usize,
    pub total: usize,
}

impl ExportProgress {
    /// Completion percentage (0.0 to 1.0).
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }
}

// ── Cancellation ────────────────────────────────────────────────

#[derive(Debug, Default)]
struct CancelState {
    flag: AtomicBool,
    notify: Notify,
}

/// Handle for cancelling an in-progress export.
#[derive(Debug, Clone, Default)]
pub struct ExportCancel(Arc<CancelState>);

impl ExportCancel {
    /// Create a new cancel handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.0.flag.store(true, Ordering::SeqCst);
        self.0.notify.notify_waiters();
    }

    /// Check if cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.0.flag.load(Ordering::SeqCst)
    }

    /// Resolve once [`ExportCancel::cancel`] has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.0.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

// ── Exporter ────────────────────────────────────────────────────

/// Single-flight export runner over a [`Transcoder`].
#[derive(Debug, Default)]
pub struct Exporter<T> {
    transcoder: T,
    in_flight: ExportGuard,
}

impl<T: Transcoder> Exporter<T> {
    pub fn new(transcoder: T) -> Self {
        Self {
            transcoder,
            in_flight: ExportGuard::new(),
        }
    }

    pub fn transcoder(&self) -> &T {
        &self.transcoder
    }

    pub fn is_exporting(&self) -> bool {
        self.in_flight.is_claimed()
    }

    /// Run `plan`. A second call while one is running on this exporter, or on
    /// any exporter for the plan's track, fails with
    /// [`MediaError::ExportInProgress`]. Any transcoder failure surfaces as
    /// [`MediaError::ExportFailed`] with no outputs.
    pub async fn export<F>(&self, plan: &ExportPlan, cancel: &ExportCancel, on_progress: F) -> Result<Vec<TranscodeOutput>>
    where
        F: Fn(ExportProgress) + Send + Sync,
    {
        let Some(_claim) = self.in_flight.try_claim() else {
            warn!("Export requested while another is running");
            return Err(MediaError::ExportInProgress);
        };
        let _track_claim = match &plan.guard {
            Some(guard) => match guard.try_claim() {
                Some(claim) => Some(claim),
                None => {
                    warn!("Export requested while the track is already exporting");
                    return Err(MediaError::ExportInProgress);
                }
            },
            None => None,
        };

        if plan.segments.is_empty() {
            return Err(MediaError::EmptyExport);
        }
        info!(kind = ?plan.kind, segments = plan.segments.len(), "Export started");

        match self.run(plan, cancel, &on_progress).await {
            Ok(outputs) => {
                info!(outputs = outputs.len(), "Export complete");
                Ok(outputs)
            }
            Err(MediaError::ExportCancelled) => {
                warn!(kind = ?plan.kind, "Export cancelled");
                Err(MediaError::ExportCancelled)
            }
            Err(e) => {
                error!(kind = ?plan.kind, error = %e, "Export failed");
                Err(MediaError::ExportFailed)
            }
        }
    }

    /// Run `plan` and hand every output to `sink`.
    pub async fn export_to<F>(
        &self,
        plan: &ExportPlan,
        cancel: &ExportCancel,
        sink: &dyn DownloadSink,
        on_progress: F,
    ) -> Result<usize>
    where
        F: Fn(ExportProgress) + Send + Sync,
    {
        let outputs = self.export(plan, cancel, on_progress).await?;
        for output in &outputs {
            sink.deliver(output);
        }
        Ok(outputs.len())
    }

    async fn run<F>(&self, plan: &ExportPlan, cancel: &ExportCancel, on_progress: &F) -> Result<Vec<TranscodeOutput>>
    where
        F: Fn(ExportProgress) + Send + Sync,
    {
        let total = plan.step_count();
        let mut outputs = Vec::with_capacity(total);

        match plan.kind {
            ExportKind::Cut => {
                for (index, segment) in plan.segments.iter().enumerate() {
                    on_progress(ExportProgress {
                        stage: ExportStage::Cutting { index, count: total },
                        completed: index,
                        total,
                    });
                    let cut = self.transcoder.cut(&segment.source, segment.start, segment.end);
                    outputs.push(step(cancel, cut).await?);
                }
            }
            ExportKind::Join => {
                on_progress(ExportProgress {
                    stage: ExportStage::Joining,
                    completed: 0,
                    total,
                });
                outputs.push(step(cancel, self.transcoder.join(&plan.segments)).await?);
            }
            ExportKind::Mix => {
                on_progress(ExportProgress {
                    stage: ExportStage::Mixing,
                    completed: 0,
                    total,
                });
                outputs.push(step(cancel, self.transcoder.mix(&plan.segments)).await?);
            }
        }

        on_progress(ExportProgress {
            stage: ExportStage::Done,
            completed: total,
            total,
        });
        Ok(outputs)
    }
}

/// Race one transcoder call against the cancel handle.
async fn step<Fut>(cancel: &ExportCancel, call: Fut) -> Result<TranscodeOutput>
where
    Fut: Future<Output = Result<TranscodeOutput>>,
{
    if cancel.is_cancelled() {
        return Err(MediaError::ExportCancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(MediaError::ExportCancelled),
        output = call => output,
    }
}
