//! Command-line interface for whisperlite
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Live chunked speech-to-text transcription via whisper.cpp
#[derive(Parser, Debug)]
#[command(name = "whisperlite", version, about = "Live chunked speech-to-text transcription")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: info, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Transcribe an existing audio file instead of capturing live
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Audio input device name (default: system default input)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Path to the Whisper model file (e.g., models/ggml-tiny.en.bin)
    #[arg(long, short = 'm', value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Path or name of the whisper.cpp binary (default: search PATH)
    #[arg(long, value_name = "PATH")]
    pub recognizer: Option<PathBuf>,

    /// Language code for transcription (e.g., en, de, es)
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Transcript output format: txt, json or srt
    #[arg(long, short = 'f', value_name = "FORMAT")]
    pub format: Option<String>,

    /// Destination directory for the transcript (default: ~/Downloads)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Base filename for the transcript (default: {user}_{timestamp})
    #[arg(long, value_name = "NAME")]
    pub output_name: Option<String>,

    /// Chunk duration (default: 1.5s). Examples: 1s, 1.5s, 2s
    #[arg(long, short = 'c', value_name = "DURATION", value_parser = parse_duration_arg)]
    pub chunk_duration: Option<Duration>,

    /// Stop automatically after this long. Examples: 30s, 5m, 1h30m
    #[arg(long, short = 'd', value_name = "DURATION", value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Retain at most this many segments (oldest evicted first)
    #[arg(long, value_name = "COUNT")]
    pub max_segments: Option<usize>,

    /// Keep intermediate chunk WAV files after transcription
    #[arg(long)]
    pub keep_chunks: bool,

    /// Flush the trailing partial chunk in file mode (off by default)
    #[arg(long)]
    pub flush_partial: bool,
}

/// Parse a duration string.
///
/// Supports any format accepted by `humantime`: bare numbers (seconds),
/// single-unit (`30s`, `5m`, `2h`) and compound (`1h30m`). Fractional
/// seconds like `1.5s` work through the bare-float path.
fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<f64>() {
        if !secs.is_finite() || secs <= 0.0 {
            return Err("duration must be positive".to_string());
        }
        return Ok(Duration::from_secs_f64(secs));
    }
    // "1.5s" style: strip a trailing unit humantime rejects for floats
    if let Some(stripped) = s.strip_suffix('s')
        && let Ok(secs) = stripped.parse::<f64>()
    {
        if !secs.is_finite() || secs <= 0.0 {
            return Err("duration must be positive".to_string());
        }
        return Ok(Duration::from_secs_f64(secs));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,
}
