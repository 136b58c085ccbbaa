//! Default configuration constants for whisperlite.
//!
//! Shared constants used across configuration types to keep the audio,
//! recognizer and session layers consistent.

use std::time::Duration;

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and the rate whisper.cpp
/// expects for its input WAV files.
pub const SAMPLE_RATE: u32 = 16000;

/// Default channel count. Chunks are written mono unless configured otherwise.
pub const CHANNELS: u16 = 1;

/// Default chunk duration in seconds.
///
/// 1.5s chunks keep the overlay responsive while giving the recognizer
/// enough context per invocation.
pub const CHUNK_DURATION_SECS: f64 = 1.5;

/// Default language code passed to the recognizer.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Hard timeout for one recognizer subprocess invocation.
///
/// After this the child is killed and the chunk contributes no segments.
pub const RECOGNIZER_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval at which a child process is polled for completion.
pub const RECOGNIZER_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Timeout for the worker's blocking wait on the next chunk.
///
/// Bounds the latency between a stop request and the worker observing it.
pub const CHUNK_RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Refresh interval for the live transcript overlay.
pub const OVERLAY_REFRESH: Duration = Duration::from_millis(500);

/// Directory name for intermediate chunk WAV files.
pub const CHUNKS_DIR: &str = "chunks";

/// Candidate names for the whisper.cpp binary when no explicit path is given.
pub const RECOGNIZER_BINARY_NAMES: &[&str] = &["whisper-cli", "whisper", "main"];

/// Compute the number of sample frames per chunk.
///
/// Rounded, not truncated, so a 1.5s chunk at 16kHz is exactly 24000 frames.
pub fn frames_per_chunk(sample_rate: u32, duration_secs: f64) -> usize {
    (sample_rate as f64 * duration_secs).round() as usize
}
