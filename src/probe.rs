//! Source video probing via the `ffprobe` CLI.
//!
//! Shells out to `ffprobe -show_format -show_streams -print_format json` and
//! maps the JSON output into the small [`ProbeInfo`] subset vodpack consumes:
//! the primary video stream's dimensions plus optional container title and
//! creation time.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::exec::ToolCommand;
use crate::tools::ToolRegistry;

/// Metadata extracted from the source container.
#[derive(Debug, Clone)]
pub struct ProbeInfo {
    /// Width of the first video stream, in pixels.
    pub width: u32,
    /// Height of the first video stream, in pixels.
    pub height: u32,
    /// Container title tag, if present.
    pub title: Option<String>,
    /// Container creation-time tag, if present and parseable.
    pub creation_time: Option<DateTime<Utc>>,
    /// Long format name reported by ffprobe.
    pub format_name: Option<String>,
}

/// Probe a source file with ffprobe.
///
/// # Errors
///
/// Returns [`Error::Probe`] if ffprobe exits non-zero, emits unparseable
/// JSON, or reports no video stream; [`Error::Tool`] if it cannot be started.
pub async fn probe(tools: &ToolRegistry, path: &Path) -> Result<ProbeInfo> {
    let ffprobe = tools.require("ffprobe")?;

    let mut cmd = ToolCommand::new(&ffprobe.path);
    cmd.args([
        "-show_format",
        "-show_streams",
        "-print_format",
        "json",
        "-loglevel",
        "quiet",
    ]);
    cmd.arg(path.to_string_lossy().as_ref());
    cmd.capture_stdout(true);

    let output = cmd.run().await?;
    if !output.status.success() {
        return Err(Error::Probe(format!(
            "ffprobe exited with non-zero status ({}) for {}",
            output.status,
            path.display()
        )));
    }

    let raw: FfprobeOutput = serde_json::from_str(output.stdout.as_deref().unwrap_or(""))
        .map_err(|e| Error::Probe(format!("ffprobe JSON parse error: {e}")))?;

    parse_probe_output(raw)
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_long_name: Option<String>,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    title: Option<String>,
    creation_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn parse_probe_output(output: FfprobeOutput) -> Result<ProbeInfo> {
    let video = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| Error::Probe("no video stream found".into()))?;

    let (width, height) = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(Error::Probe(
                "video stream is missing valid dimensions".into(),
            ))
        }
    };

    let (title, creation_time, format_name) = match output.format {
        Some(format) => (
            format.tags.title,
            format
                .tags
                .creation_time
                .as_deref()
                .and_then(parse_creation_time),
            format.format_long_name,
        ),
        None => (None, None, None),
    };

    Ok(ProbeInfo {
        width,
        height,
        title,
        creation_time,
        format_name,
    })
}

fn parse_creation_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
