//! Thread-safe rolling transcript storage.

use crate::transcript::segment::Segment;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Append-only, optionally bounded accumulator of transcript segments.
///
/// Shared between the transcription worker (appends), the overlay (reads
/// snapshots) and the finalizer (drains). Every operation takes the single
/// internal mutex, so a reader never observes a partially-appended batch.
/// Update frequency is roughly one append per chunk (1–2s), so the fully
/// serialized lock is the right trade.
pub struct TranscriptBuffer {
    inner: Mutex<VecDeque<Segment>>,
    max_len: Option<usize>,
}

impl TranscriptBuffer {
    /// Create an unbounded buffer.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            max_len: None,
        }
    }

    /// Create a buffer that retains at most `max_len` segments,
    /// evicting the oldest first.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            max_len: Some(max_len),
        }
    }

    /// Atomically append all segments in order, then evict oldest
    /// segments until the configured bound holds.
    pub fn append(&self, segments: Vec<Segment>) {
        if segments.is_empty() {
            return;
        }
        let mut inner = self.lock();
        inner.extend(segments);
        if let Some(max) = self.max_len {
            while inner.len() > max {
                inner.pop_front();
            }
        }
    }

    /// Point-in-time copy of all segments, in buffer order.
    pub fn get_segments(&self) -> Vec<Segment> {
        self.lock().iter().cloned().collect()
    }

    /// All current segment texts joined by a single space, in buffer order.
    pub fn full_text(&self) -> String {
        let inner = self.lock();
        let mut text = String::new();
        for (i, segment) in inner.iter().enumerate() {
            if i > 0 {
                text.push(' ');
            }
            text.push_str(&segment.text);
        }
        text
    }

    /// Atomically empty the buffer and return what was removed.
    ///
    /// The drain-and-return shape gives the writer exactly-once hand-off.
    pub fn clear(&self) -> Vec<Segment> {
        self.lock().drain(..).collect()
    }

    /// Current segment count.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Segment>> {
        // A poisoned lock means an appender panicked mid-write; the segment
        // deque itself is still structurally valid, so keep serving readers.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for TranscriptBuffer {
    fn default() -> Self {
        Self::new()
    }
}
