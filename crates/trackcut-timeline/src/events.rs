//! Typed event bus scoped to one editor session.
//!
//! Each subscriber gets its own unbounded channel. Subscribers that have
//! dropped their receiver are pruned on the next publish.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Something observable happened on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimelineEvent {
    ClipAdded { clip_id: Uuid },
    ClipRemoved { clip_id: Uuid },
    ClipMoved { clip_id: Uuid, timeline_start: f64 },
    TrimChanged { clip_id: Uuid, start: f64, end: f64, duration: f64 },
    DurationChanged { total: f64 },
    AxisChanged { pixels_per_second: f64 },
    PlayheadMoved { seconds: f64 },
    ActiveClipsChanged { active: Vec<Uuid> },
    PlaybackStarted { playhead: f64 },
    PlaybackStopped { playhead: f64 },
}

/// Fan-out publisher for [`TimelineEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Sender<TimelineEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> Receiver<TimelineEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver an event to every live subscriber.
    pub fn publish(&self, event: TimelineEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
