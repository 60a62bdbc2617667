//! Pointer drag state machine.
//!
//! Tracks a horizontal offset for one draggable element. The controller only
//! knows about pixels; what a drag means (moving a clip, pulling a trim handle)
//! is decided by the caller from the handle that started it.

use serde::{Deserialize, Serialize};

use crate::trim::TrimHandle;

/// Mouse button (or pen/touch equivalent) that started a pointer sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Part of an element that accepts drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureHandle {
    Left,
    Right,
    Move,
}

impl GestureHandle {
    /// Trim side for resize handles.
    pub fn trim_handle(self) -> Option<TrimHandle> {
        match self {
            GestureHandle::Left => Some(TrimHandle::Left),
            GestureHandle::Right => Some(TrimHandle::Right),
            GestureHandle::Move => None,
        }
    }
}

/// Limits on the pixel delta of one drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragBounds {
    pub min: f64,
    pub max: f64,
}

impl DragBounds {
    pub const UNBOUNDED: Self = Self {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    /// Bounds keeping an element at `[left, left + width)` inside `[0, parent_width]`.
    pub fn within_parent(left: f64, width: f64, parent_width: f64) -> Self {
        let min = -left;
        let max = parent_width - (left + width);
        Self {
            min,
            max: max.max(min),
        }
    }

    #[inline]
    pub fn clamp(self, delta: f64) -> f64 {
        delta.clamp(self.min, self.max)
    }
}

/// Transient state between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSession {
    /// Pointer x at pointer-down, in client pixels
    pub anchor_client_x: f64,
    pub handle: GestureHandle,
    /// Resting offset when the drag started
    pub origin_offset: f64,
    pub bounds: DragBounds,
}

impl DragSession {
    /// Clamped delta for a pointer at `client_x`.
    pub fn delta(&self, client_x: f64) -> f64 {
        if !client_x.is_finite() {
            return 0.0;
        }
        self.bounds.clamp(client_x - self.anchor_client_x)
    }
}

/// Outcome of a completed drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragRelease {
    pub handle: GestureHandle,
    /// Clamped delta of this drag
    pub delta: f64,
    /// Resting offset after the commit
    pub offset: f64,
}

/// Idle/Dragging state machine producing cumulative horizontal offsets.
///
/// Pointer-up is honoured wherever the pointer is released, so a drag that
/// leaves the element still commits. Only [`DragController::pointer_cancel`]
/// reverts.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    offset: f64,
    live_offset: f64,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Committed offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Offset including the drag in progress.
    pub fn live_offset(&self) -> f64 {
        self.live_offset
    }

    /// Replace the committed offset, e.g. after the owner re-lays out the element.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
        if self.session.is_none() {
            self.live_offset = offset;
        }
    }

    /// Start a drag. Returns `false` if the press is ignored.
    pub fn pointer_down(
        &mut self,
        button: PointerButton,
        client_x: f64,
        handle: Option<GestureHandle>,
        bounds: DragBounds,
    ) -> bool {
        if button == PointerButton::Secondary || self.session.is_some() || !client_x.is_finite() {
            return false;
        }
        let Some(handle) = handle else {
            return false;
        };
        self.session = Some(DragSession {
            anchor_client_x: client_x,
            handle,
            origin_offset: self.offset,
            bounds,
        });
        self.live_offset = self.offset;
        true
    }

    /// Update the live offset. Returns the clamped delta, or `None` when idle.
    pub fn pointer_move(&mut self, client_x: f64) -> Option<f64> {
        let session = self.session?;
        let delta = session.delta(client_x);
        self.live_offset = session.origin_offset + delta;
        Some(delta)
    }

    /// Finish the drag and commit the offset.
    pub fn pointer_up(&mut self, client_x: f64) -> Option<DragRelease> {
        let session = self.session.take()?;
        let delta = session.delta(client_x);
        self.offset = session.origin_offset + delta;
        self.live_offset = self.offset;
        Some(DragRelease {
            handle: session.handle,
            delta,
            offset: self.offset,
        })
    }

    /// Abandon the drag, reverting to the committed offset.
    pub fn pointer_cancel(&mut self) -> Option<DragSession> {
        let session = self.session.take()?;
        self.live_offset = self.offset;
        Some(session)
    }
}
