//! Audio capture, slicing and WAV handling.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod slicer;
pub mod source;
pub mod wav;

pub use slicer::{AudioChunk, ChunkSlicer};
pub use source::{AudioSource, MockAudioSource};
pub use wav::WavFileSource;
