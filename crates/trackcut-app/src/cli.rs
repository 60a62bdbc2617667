//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;
use trackcut_timeline::EditorMode;

/// One clip given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipArg {
    pub name: String,
    pub duration: f64,
    pub trim: Option<(f64, f64)>,
    /// Requested timeline start, for the free layouts
    pub offset: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(name = "trackcut")]
#[command(version)]
#[command(about = "Headless timeline editor: trim, arrange, play and export clips")]
pub struct Args {
    /// Editor to run: audio-cut, video-cut, audio-join, video-join or multi-channel
    pub mode: EditorMode,

    /// Clips as name:duration[:start-end][@offset]
    #[arg(required = true, value_parser = parse_clip)]
    pub clips: Vec<ClipArg>,

    /// Editor config file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory the exported files are written to
    #[arg(short, long, default_value = ".")]
    pub out: PathBuf,

    /// Timeline container width in pixels
    #[arg(long, default_value = "1280", value_parser = parse_non_negative)]
    pub width: f64,

    /// Play the timeline for this many seconds before exporting
    #[arg(long, value_parser = parse_non_negative)]
    pub play: Option<f64>,
}

fn parse_non_negative(text: &str) -> Result<f64, String> {
    let n: f64 = text.parse().map_err(|_| format!("not a number: {}", text))?;
    if !(n.is_finite() && n >= 0.0) {
        return Err(format!("must be a non-negative number, got {}", text));
    }
    Ok(n)
}

/// Parse `name:duration[:start-end][@offset]`.
fn parse_clip(text: &str) -> Result<ClipArg, String> {
    let (body, offset) = match text.rsplit_once('@') {
        Some((body, offset)) => (body, Some(parse_non_negative(offset)?)),
        None => (text, None),
    };
    let mut parts = body.split(':');
    let name = parts
        .next()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| format!("clip needs a name: {}", text))?;
    let duration = parse_non_negative(
        parts
            .next()
            .ok_or_else(|| format!("clip needs a duration: {}", text))?,
    )?;
    let trim = match parts.next() {
        Some(range) => {
            let (start, end) = range
                .split_once('-')
                .ok_or_else(|| format!("trim must look like start-end: {}", range))?;
            Some((parse_non_negative(start)?, parse_non_negative(end)?))
        }
        None => None,
    };
    if parts.next().is_some() {
        return Err(format!("too many fields in clip: {}", text));
    }
    Ok(ClipArg {
        name: name.to_string(),
        duration,
        trim,
        offset,
    })
}
