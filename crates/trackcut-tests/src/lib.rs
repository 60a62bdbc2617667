//! Integration test crate for TrackCut.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the core, timeline and media crates to verify they work together.

#[cfg(test)]
mod timeline;

#[cfg(test)]
mod playback;

#[cfg(test)]
mod export;
