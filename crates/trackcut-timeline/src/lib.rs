//! TrackCut Timeline - Timeline interaction engine
//!
//! Maps pixel-space gestures to time-space edits and keeps media in sync:
//! - Clips with trim regions
//! - Pointer drag state machine and collision resolution
//! - A single playhead clock driving every clip's media
//! - The track aggregate producing the ordered export list
//! - Editor sessions tying a track to its clock

pub mod clip;
pub mod clock;
pub mod collision;
pub mod drag;
pub mod events;
pub mod guard;
pub mod playback;
pub mod session;
pub mod track;
pub mod trim;

pub use clip::{Clip, ClipSource, MediaKind};
pub use clock::{
    ActivationMode, ClockState, MediaElement, PlaybackState, ScheduledClip, TickOutcome, TickPlan,
    TimelineClock,
};
pub use collision::{CollisionResolver, Overlap};
pub use drag::{DragBounds, DragController, DragRelease, DragSession, GestureHandle, PointerButton};
pub use events::{EventBus, TimelineEvent};
pub use guard::{ExportClaim, ExportGuard};
pub use playback::ClockDriver;
pub use session::{EditorMode, EditorSession};
pub use track::{ExportEntry, LayoutPolicy, TrackModel};
pub use trim::{TrimChange, TrimHandle, TrimRegion};
