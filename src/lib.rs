//! whisperlite - Live chunked speech-to-text transcription
//!
//! Captures microphone audio (or reads a WAV file), slices it into
//! fixed-duration chunks, transcribes each chunk through a whisper.cpp
//! subprocess, and writes the accumulated transcript as txt, json or srt.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod overlay;
pub mod session;
pub mod stt;
pub mod transcript;

// Core seams (source → slice → transcribe → buffer → write)
pub use audio::{AudioChunk, AudioSource, ChunkSlicer};
pub use stt::Recognizer;
pub use transcript::{Segment, TranscriptBuffer};

// Session orchestration
pub use session::{SessionController, SessionOptions, SessionState, StopFlag};

// Error handling
pub use error::{Result, WhisperLiteError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.0+abc1234"` when git hash is available, `"0.3.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        // In a git repo build, GIT_HASH is set → expect "0.3.0+<hash>"
        // In CI without git, expect plain "0.3.0"
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
