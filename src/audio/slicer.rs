//! Chunk boundary logic for the streaming pipeline.
//!
//! Consumes raw PCM sample blocks of arbitrary size and emits fixed-duration
//! chunks in strict FIFO order. The unit of hand-off to the recognizer.

use crate::defaults;

/// One fixed-duration slice of captured audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    /// Sequential 1-based chunk index.
    pub index: u32,
    /// Interleaved 16-bit PCM samples.
    pub samples: Vec<i16>,
}

/// Slices an arbitrary-block sample stream into fixed-size chunks.
///
/// Every emitted chunk holds exactly `frames_per_chunk * channels` samples;
/// partial trailing samples stay buffered until the next block or until the
/// caller decides what to do with the remainder at stream end. No sample is
/// ever dropped, duplicated or reordered.
pub struct ChunkSlicer {
    samples_per_chunk: usize,
    buffer: Vec<i16>,
    next_index: u32,
}

impl ChunkSlicer {
    /// Create a slicer for the given chunk duration and stream shape.
    pub fn new(chunk_duration_secs: f64, sample_rate: u32, channels: u16) -> Self {
        let frames = defaults::frames_per_chunk(sample_rate, chunk_duration_secs);
        Self {
            samples_per_chunk: frames * channels as usize,
            buffer: Vec::new(),
            next_index: 1,
        }
    }

    /// Number of interleaved samples per emitted chunk.
    pub fn samples_per_chunk(&self) -> usize {
        self.samples_per_chunk
    }

    /// Count of chunks emitted so far.
    pub fn emitted(&self) -> u32 {
        self.next_index - 1
    }

    /// Accept one block of samples, returning every full chunk it completes.
    ///
    /// Blocks may be any size, down to a single sample. Chunks come out in
    /// temporal order with strictly increasing indices starting at 1.
    pub fn push(&mut self, block: &[i16]) -> Vec<AudioChunk> {
        self.buffer.extend_from_slice(block);

        let mut chunks = Vec::new();
        while self.buffer.len() >= self.samples_per_chunk {
            let samples: Vec<i16> = self.buffer.drain(..self.samples_per_chunk).collect();
            chunks.push(AudioChunk {
                index: self.next_index,
                samples,
            });
            self.next_index += 1;
        }
        chunks
    }

    /// Number of samples currently buffered below the chunk threshold.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Flush buffered trailing samples as a short final chunk, if any.
    ///
    /// Live capture discards the remainder on stop; batch mode calls this
    /// behind an explicit flush option.
    pub fn finish(&mut self) -> Option<AudioChunk> {
        if self.buffer.is_empty() {
            return None;
        }
        let chunk = AudioChunk {
            index: self.next_index,
            samples: std::mem::take(&mut self.buffer),
        };
        self.next_index += 1;
        Some(chunk)
    }
}
