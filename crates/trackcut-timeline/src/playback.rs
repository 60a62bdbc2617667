//! Timer task driving a [`TimelineClock`].
//!
//! The clock lives behind a mutex shared with one spawned task. The task's
//! handle is owned by the driver, and dropping the handle aborts the task, so
//! pausing, replacing the timer and tearing the driver down all stop ticking.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use trackcut_core::{Result, TrackCutError};
use tracing::debug;

use crate::clock::{PlaybackState, ScheduledClip, TickOutcome, TickPlan, TimelineClock};

/// Aborts its task when dropped.
#[derive(Debug)]
struct Ticker(JoinHandle<()>);

impl Drop for Ticker {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Owns the clock and its timer task.
#[derive(Debug)]
pub struct ClockDriver {
    clock: Arc<Mutex<TimelineClock>>,
    runtime: Handle,
    ticker: Option<Ticker>,
}

impl ClockDriver {
    /// Bind to the current tokio runtime.
    ///
    /// Fails when called outside a runtime context.
    pub fn new(clock: TimelineClock) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            TrackCutError::Configuration(format!("no async runtime for the timeline clock: {}", e))
        })?;
        Ok(Self::with_handle(clock, runtime))
    }

    /// Bind to an explicit runtime.
    pub fn with_handle(clock: TimelineClock, runtime: Handle) -> Self {
        Self {
            clock: Arc::new(Mutex::new(clock)),
            runtime,
            ticker: None,
        }
    }

    /// Lock the clock for inspection or direct manipulation.
    pub fn lock(&self) -> MutexGuard<'_, TimelineClock> {
        self.clock.lock()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.clock.lock().playback_state()
    }

    /// Whether a timer task is alive.
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.0.is_finished())
    }

    /// Start the clock and spawn its timer. Any previous timer is cancelled.
    pub fn play(&mut self, plan: TickPlan) -> bool {
        self.ticker = None;
        if !self.clock.lock().start(plan) {
            return false;
        }

        let clock = Arc::clone(&self.clock);
        let handle = self.runtime.spawn(async move {
            let mut timer = interval_at(Instant::now() + plan.interval, plan.interval);
            loop {
                timer.tick().await;
                let outcome = clock.lock().tick();
                if outcome == TickOutcome::Finished {
                    break;
                }
            }
            debug!("Clock timer finished");
        });
        self.ticker = Some(Ticker(handle));
        true
    }

    /// Cancel the timer and pause the clock.
    pub fn pause(&mut self) -> bool {
        self.ticker = None;
        self.clock.lock().pause()
    }

    pub fn seek_to(&mut self, seconds: f64) -> f64 {
        self.clock.lock().seek_to(seconds)
    }

    pub fn seek_by(&mut self, delta: f64) -> f64 {
        self.clock.lock().seek_by(delta)
    }

    /// Push a non-structural schedule update; a zero total cancels the timer.
    pub fn update_schedule(&mut self, schedule: Vec<ScheduledClip>) {
        let mut clock = self.clock.lock();
        clock.set_schedule(schedule);
        if clock.total_duration() <= 0.0 {
            self.ticker = None;
        }
    }

    /// Cancel the timer and reset the clock onto a new schedule.
    pub fn reset(&mut self, schedule: Vec<ScheduledClip>) {
        self.ticker = None;
        self.clock.lock().reset(schedule);
    }

    /// Cancel the timer for good.
    pub fn shutdown(&mut self) {
        self.ticker = None;
        self.clock.lock().pause();
    }
}
