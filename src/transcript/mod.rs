//! Transcript accumulation and persistence.

pub mod buffer;
pub mod segment;
pub mod writer;

pub use buffer::TranscriptBuffer;
pub use segment::Segment;
pub use writer::{OutputFormat, default_base_name, save_transcript};
