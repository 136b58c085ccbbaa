//! Recognizer abstraction.
//!
//! The speech-to-text engine is an opaque external collaborator; this trait
//! is the seam between the pipeline and whatever performs the recognition.

use crate::error::{Result, WhisperLiteError};
use crate::transcript::Segment;
use std::path::Path;
use std::sync::Arc;

/// Environment variable that substitutes the canned mock recognizer for the
/// real subprocess. Lets end-to-end runs and tests work without whisper.cpp.
pub const MOCK_RECOGNIZER_ENV: &str = "WHISPERLITE_MOCK_RECOGNIZER";

/// Trait for per-chunk speech-to-text transcription.
///
/// `transcribe_chunk` is synchronous and blocking; callers run it on a
/// worker thread so it never stalls audio capture.
pub trait Recognizer: Send + Sync {
    /// Transcribe one chunk WAV file into timed segments.
    ///
    /// Per-chunk failures (timeout, bad output) yield `Ok(vec![])`; an `Err`
    /// is reserved for conditions the caller may want to surface.
    fn transcribe_chunk(&self, chunk: &Path) -> Result<Vec<Segment>>;

    /// Check if the recognizer is ready
    fn is_ready(&self) -> bool;
}

/// Implement Recognizer for Arc<T> to allow sharing across threads.
impl<T: Recognizer> Recognizer for Arc<T> {
    fn transcribe_chunk(&self, chunk: &Path) -> Result<Vec<Segment>> {
        (**self).transcribe_chunk(chunk)
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

impl<T: Recognizer + ?Sized> Recognizer for Box<T> {
    fn transcribe_chunk(&self, chunk: &Path) -> Result<Vec<Segment>> {
        (**self).transcribe_chunk(chunk)
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Whether the mock-recognizer environment override is active.
pub fn mock_recognizer_requested() -> bool {
    std::env::var(MOCK_RECOGNIZER_ENV).is_ok_and(|v| v == "1" || v == "true")
}

/// Fixed segment sequence used by the mock recognizer.
pub fn canned_segments() -> Vec<Segment> {
    vec![
        Segment::new("00:00:00.000", "00:00:03.000", "This is a test."),
        Segment::new("00:00:03.500", "00:00:06.000", "CLI mode."),
    ]
}

/// Mock recognizer for testing
pub struct MockRecognizer {
    segments: Vec<Segment>,
    should_fail: bool,
}

impl MockRecognizer {
    /// Create a mock returning the canned segment sequence per chunk.
    pub fn new() -> Self {
        Self {
            segments: canned_segments(),
            should_fail: false,
        }
    }

    /// Configure the mock to return specific segments
    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Recognizer for MockRecognizer {
    fn transcribe_chunk(&self, _chunk: &Path) -> Result<Vec<Segment>> {
        if self.should_fail {
            Err(WhisperLiteError::Invocation {
                message: "mock recognizer failure".to_string(),
            })
        } else {
            Ok(self.segments.clone())
        }
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
