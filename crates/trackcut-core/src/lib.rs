//! TrackCut Core - Foundation types for the timeline engine
//!
//! This crate provides the types every other TrackCut crate builds on:
//! - Pixel/time conversion (TimeAxis), timecodes, ruler ticks
//! - Axis-aligned boxes used for clip collision tests
//! - Editor configuration
//! - The shared error type

pub mod config;
pub mod error;
pub mod geometry;
pub mod time;

pub use config::EditorConfig;
pub use error::{Result, TrackCutError};
pub use geometry::Rect;
pub use time::{format_timecode, ruler_ticks, thumbnail_times, RulerTick, TimeAxis};
