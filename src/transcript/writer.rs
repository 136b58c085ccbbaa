//! Transcript serialization to disk.
//!
//! One file per session, written in full-overwrite mode: either the whole
//! rendered content is committed or the error surfaces before anything is.

use crate::error::{Result, WhisperLiteError};
use crate::transcript::segment::Segment;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported transcript output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Txt,
    Json,
    Srt,
}

impl OutputFormat {
    /// File extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Srt => "srt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = WhisperLiteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "txt" => Ok(OutputFormat::Txt),
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            other => Err(WhisperLiteError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Default base filename: `{username}_{YYYYMMDD_HHMM}`.
pub fn default_base_name(timestamp: DateTime<Local>) -> String {
    let username = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "user".to_string());
    format!("{}_{}", username, timestamp.format("%Y%m%d_%H%M"))
}

/// Serialize the transcript and write exactly one file, returning its path.
///
/// The requested format is validated before anything touches the filesystem,
/// so an unsupported value never leaves a file behind. Directory creation is
/// idempotent. I/O failures are wrapped with the destination path and are
/// fatal to finalization.
pub fn save_transcript(
    segments: &[Segment],
    full_text: &str,
    output_dir: &Path,
    base_name: &str,
    format: &str,
    generated_at: DateTime<Local>,
) -> Result<PathBuf> {
    let format = OutputFormat::from_str(format)?;

    let content = match format {
        OutputFormat::Txt => render_txt(full_text, generated_at),
        OutputFormat::Json => render_json(segments)?,
        OutputFormat::Srt => render_srt(segments),
    };

    fs::create_dir_all(output_dir).map_err(|source| WhisperLiteError::TranscriptWrite {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_dir.join(format!("{}.{}", base_name, format.extension()));
    fs::write(&path, content).map_err(|source| WhisperLiteError::TranscriptWrite {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// Header line + blank line + plain text content, verbatim.
fn render_txt(full_text: &str, generated_at: DateTime<Local>) -> String {
    format!(
        "WhisperLite Transcript - Generated on {}\n\n{}",
        generated_at.format("%Y-%m-%d %H:%M"),
        full_text
    )
}

/// Segments pretty-printed with 4-space indentation, field order
/// `start, end, text`, non-ASCII characters kept literal.
fn render_json(segments: &[Segment]) -> Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    segments
        .serialize(&mut serializer)
        .map_err(|e| WhisperLiteError::Other(format!("JSON serialization failed: {}", e)))?;
    String::from_utf8(out)
        .map_err(|e| WhisperLiteError::Other(format!("JSON output not UTF-8: {}", e)))
}

/// SubRip rendering: 1-based index, comma-millisecond timestamps, text,
/// blank separator line after every cue including the last.
fn render_srt(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            srt_timestamp(&segment.start),
            srt_timestamp(&segment.end),
            segment.text
        ));
    }
    out
}

/// Rewrite `HH:MM:SS.mmm` to the SubRip `HH:MM:SS,mmm` convention.
fn srt_timestamp(ts: &str) -> String {
    match ts.rfind('.') {
        Some(i) => {
            let mut s = ts.to_string();
            s.replace_range(i..i + 1, ",");
            s
        }
        None => ts.to_string(),
    }
}
