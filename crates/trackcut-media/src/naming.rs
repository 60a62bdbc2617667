//! Output file names.

use trackcut_timeline::{ClipSource, MediaKind};

pub const AUDIO_JOIN_NAME: &str = "media_join.mp3";
pub const VIDEO_JOIN_NAME: &str = "media_video_join.mp4";
pub const MIX_NAME: &str = "media_mix.mp3";

/// Container extension for a media kind.
pub fn extension(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Audio => "mp3",
        MediaKind::Video => "mp4",
    }
}

/// Name of a cut of `source`: `<stem>(media_cut).mp3` or `<stem>(media_video_cut).mp4`.
pub fn cut_name(source: &ClipSource) -> String {
    let tag = match source.kind {
        MediaKind::Audio => "media_cut",
        MediaKind::Video => "media_video_cut",
    };
    format!("{}({}).{}", source.stem(), tag, extension(source.kind))
}

pub fn join_name(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Audio => AUDIO_JOIN_NAME,
        MediaKind::Video => VIDEO_JOIN_NAME,
    }
}
