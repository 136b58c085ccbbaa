//! WAV encoding of chunks and WAV file input for batch mode.

use crate::audio::source::AudioSource;
use crate::error::{Result, WhisperLiteError};
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

/// Encode interleaved 16-bit PCM samples as an in-memory WAV byte sequence.
pub fn encode_wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(|e| {
        WhisperLiteError::AudioCapture {
            message: format!("Failed to create WAV writer: {}", e),
        }
    })?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| WhisperLiteError::AudioCapture {
                message: format!("Failed to encode WAV sample: {}", e),
            })?;
    }
    writer
        .finalize()
        .map_err(|e| WhisperLiteError::AudioCapture {
            message: format!("Failed to finalize WAV data: {}", e),
        })?;

    Ok(cursor.into_inner())
}

/// Filename for a chunk: `chunk_001.wav`, zero-padded, 1-based.
pub fn chunk_file_name(index: u32) -> String {
    format!("chunk_{:03}.wav", index)
}

/// Write one chunk to `dir` as a WAV file and return its path.
///
/// Creates the directory if needed (idempotent).
pub fn write_chunk_file(
    dir: &Path,
    index: u32,
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(chunk_file_name(index));
    let bytes = encode_wav_bytes(samples, sample_rate, channels)?;
    fs::write(&path, bytes)?;
    Ok(path)
}

/// Audio source that reads from WAV file data.
///
/// Decodes the whole file up front, downmixes stereo to mono and resamples
/// to the target rate, then delivers fixed-size blocks until exhausted.
/// Batch mode runs these blocks through the same slicer as live capture.
pub struct WavFileSource {
    samples: Vec<i16>,
    position: usize,
    block_size: usize,
}

impl WavFileSource {
    /// Open a WAV file from disk.
    pub fn open(path: &Path, target_rate: u32) -> Result<Self> {
        let file = fs::File::open(path).map_err(|e| WhisperLiteError::AudioCapture {
            message: format!("Failed to open {}: {}", path.display(), e),
        })?;
        Self::from_reader(Box::new(file), target_rate)
    }

    /// Create from any reader (for testing/flexibility).
    pub fn from_reader(reader: Box<dyn Read + Send>, target_rate: u32) -> Result<Self> {
        let mut wav_reader =
            hound::WavReader::new(reader).map_err(|e| WhisperLiteError::AudioCapture {
                message: format!("Failed to parse WAV file: {}", e),
            })?;

        let spec = wav_reader.spec();
        let source_rate = spec.sample_rate;
        let source_channels = spec.channels;

        let raw_samples: Vec<i16> = wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| WhisperLiteError::AudioCapture {
                message: format!("Failed to read WAV samples: {}", e),
            })?;

        let mono_samples = if source_channels == 2 {
            raw_samples
                .chunks_exact(2)
                .map(|pair| {
                    let left = pair[0] as i32;
                    let right = pair[1] as i32;
                    ((left + right) / 2) as i16
                })
                .collect()
        } else {
            raw_samples
        };

        let samples = if source_rate != target_rate {
            resample(&mono_samples, source_rate, target_rate)
        } else {
            mono_samples
        };

        // 100ms blocks, deliberately not chunk-aligned: the slicer owns
        // chunk boundaries.
        let block_size = (target_rate / 10) as usize;

        Ok(Self {
            samples,
            position: 0,
            block_size,
        })
    }

    /// Total decoded sample count.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl AudioSource for WavFileSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.position >= self.samples.len() {
            return Ok(Vec::new());
        }

        let end = std::cmp::min(self.position + self.block_size, self.samples.len());
        let block = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(block)
    }
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
