use crate::error::{Result, WhisperLiteError};

/// Trait for audio sample sources.
///
/// Allows swapping implementations (live device, WAV file, mock) behind the
/// same pull interface the batch path and the tests use.
pub trait AudioSource: Send {
    /// Start delivering audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop delivering audio and release the source.
    fn stop(&mut self) -> Result<()>;

    /// Read the next block of 16-bit PCM samples.
    ///
    /// An empty vector means no samples are available right now (or the
    /// source is exhausted, for finite sources).
    fn read_samples(&mut self) -> Result<Vec<i16>>;
}

/// Mock audio source for testing
pub struct MockAudioSource {
    is_started: bool,
    blocks: Vec<Vec<i16>>,
    position: usize,
    should_fail_start: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a mock that delivers the given blocks in order, then empties.
    pub fn with_blocks(blocks: Vec<Vec<i16>>) -> Self {
        Self {
            is_started: false,
            blocks,
            position: 0,
            should_fail_start: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure the mock to fail on start
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(WhisperLiteError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        self.is_started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.position >= self.blocks.len() {
            return Ok(Vec::new());
        }
        let block = self.blocks[self.position].clone();
        self.position += 1;
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_delivers_blocks_in_order_then_empties() {
        let mut source = MockAudioSource::with_blocks(vec![vec![1, 2], vec![3]]);
        source.start().unwrap();
        assert!(source.is_started());

        assert_eq!(source.read_samples().unwrap(), vec![1, 2]);
        assert_eq!(source.read_samples().unwrap(), vec![3]);
        assert!(source.read_samples().unwrap().is_empty());

        source.stop().unwrap();
        assert!(!source.is_started());
    }

    #[test]
    fn mock_start_failure_reports_capture_error() {
        let mut source = MockAudioSource::with_blocks(vec![]).with_start_failure();
        let result = source.start();
        assert!(matches!(
            result,
            Err(WhisperLiteError::AudioCapture { .. })
        ));
    }
}
