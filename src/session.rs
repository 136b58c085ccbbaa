//! Session orchestration: capture → slice → transcribe → buffer → write.

use crate::audio::slicer::AudioChunk;
use crate::audio::wav;
use crate::defaults;
use crate::error::Result;
use crate::stt::Recognizer;
use crate::transcript::{Segment, TranscriptBuffer, save_transcript};
use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Cooperative stop signal shared between the worker loop and any
/// interactive control surface.
///
/// Monotonic false→true; never reset within one session. Requesting stop
/// twice has the same observable effect as once.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn should_stop(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lifecycle of one transcription session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Capturing,
    Draining,
    Saved,
    Aborted,
}

/// Per-session options for the worker loop.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Directory for intermediate chunk WAV files.
    pub chunks_dir: PathBuf,
    /// Keep chunk files after transcription instead of deleting them.
    pub keep_chunks: bool,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            chunks_dir: PathBuf::from(defaults::CHUNKS_DIR),
            keep_chunks: false,
            sample_rate: defaults::SAMPLE_RATE,
            channels: defaults::CHANNELS,
        }
    }
}

/// Drives the per-chunk worker loop and the final transcript write.
///
/// Chunks are consumed in strict FIFO order with exactly one recognizer
/// invocation in flight; segment append order therefore equals chunk
/// production order. The loop polls the stop flag at bounded intervals and
/// never holds a lock across a blocking point.
pub struct SessionController<R: Recognizer> {
    recognizer: R,
    buffer: Arc<TranscriptBuffer>,
    stop: StopFlag,
    options: SessionOptions,
    state: SessionState,
}

impl<R: Recognizer> SessionController<R> {
    pub fn new(
        recognizer: R,
        buffer: Arc<TranscriptBuffer>,
        stop: StopFlag,
        options: SessionOptions,
    ) -> Self {
        Self {
            recognizer,
            buffer,
            stop,
            options,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    /// Mark the session as failed before any chunk was produced.
    pub fn abort(&mut self) {
        self.state = SessionState::Aborted;
    }

    /// Worker loop: poll for chunks until the stop flag fires or the
    /// producer side disconnects (batch source exhausted).
    ///
    /// After a stop request no new chunk is submitted for transcription;
    /// the in-flight invocation finishes (or hits its timeout) first.
    pub fn run(&mut self, chunks: &Receiver<AudioChunk>) {
        self.state = SessionState::Capturing;

        loop {
            if self.stop.should_stop() {
                break;
            }
            match chunks.recv_timeout(defaults::CHUNK_RECV_TIMEOUT) {
                Ok(chunk) => self.process_chunk(chunk),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.state = SessionState::Draining;
    }

    /// Handle one chunk: persist, transcribe, append.
    ///
    /// A chunk write failure is logged and drops only that chunk; the audio
    /// stream and the rest of the session continue uninterrupted. Recognizer
    /// failures likewise contribute an empty segment list.
    fn process_chunk(&mut self, chunk: AudioChunk) {
        let index = chunk.index;
        let path = match wav::write_chunk_file(
            &self.options.chunks_dir,
            index,
            &chunk.samples,
            self.options.sample_rate,
            self.options.channels,
        ) {
            Ok(path) => path,
            Err(e) => {
                warn!(chunk = index, error = %e, "failed to persist chunk, dropping");
                return;
            }
        };
        debug!(chunk = index, path = %path.display(), "chunk saved");

        let segments = match self.recognizer.transcribe_chunk(&path) {
            Ok(segments) => segments,
            Err(e) => {
                warn!(chunk = index, error = %e, "transcription failed for chunk");
                Vec::new()
            }
        };

        if !segments.is_empty() {
            self.buffer.append(segments);
        }

        if !self.options.keep_chunks
            && let Err(e) = fs::remove_file(&path)
        {
            debug!(path = %path.display(), error = %e, "failed to remove chunk file");
        }
    }

    /// Drain the buffer exactly once and write the transcript.
    ///
    /// Returns the written path. I/O failures surface to the caller; the
    /// buffer contents travel with the error path only in the sense that
    /// they have already been drained — finalize is a one-shot hand-off.
    pub fn finalize(
        &mut self,
        output_dir: &Path,
        base_name: &str,
        format: &str,
        generated_at: DateTime<Local>,
    ) -> Result<PathBuf> {
        let segments = self.buffer.clear();
        let full_text = join_texts(&segments);

        let path = save_transcript(
            &segments,
            &full_text,
            output_dir,
            base_name,
            format,
            generated_at,
        )?;

        self.state = SessionState::Saved;
        info!(path = %path.display(), segments = segments.len(), "transcript saved");
        Ok(path)
    }
}

/// Segment texts joined by single spaces, in order.
fn join_texts(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::MockRecognizer;
    use chrono::TimeZone;
    use crossbeam_channel::unbounded;
    use std::thread;
    use tempfile::tempdir;

    fn options(dir: &Path) -> SessionOptions {
        SessionOptions {
            chunks_dir: dir.join("chunks"),
            keep_chunks: false,
            sample_rate: 16000,
            channels: 1,
        }
    }

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn stop_flag_is_monotonic_and_idempotent() {
        let flag = StopFlag::new();
        assert!(!flag.should_stop());

        flag.request_stop();
        assert!(flag.should_stop());

        // Second request changes nothing observable.
        flag.request_stop();
        assert!(flag.should_stop());
        assert!(flag.should_stop());
    }

    #[test]
    fn stop_flag_clones_share_state() {
        let flag = StopFlag::new();
        let clone = flag.clone();
        clone.request_stop();
        assert!(flag.should_stop());
    }

    #[test]
    fn run_processes_chunks_until_disconnect() {
        let dir = tempdir().unwrap();
        let buffer = Arc::new(TranscriptBuffer::new());
        let mut controller = SessionController::new(
            MockRecognizer::new(),
            Arc::clone(&buffer),
            StopFlag::new(),
            options(dir.path()),
        );

        let (tx, rx) = unbounded();
        tx.send(AudioChunk {
            index: 1,
            samples: vec![0i16; 160],
        })
        .unwrap();
        tx.send(AudioChunk {
            index: 2,
            samples: vec![0i16; 160],
        })
        .unwrap();
        drop(tx);

        assert_eq!(controller.state(), SessionState::Idle);
        controller.run(&rx);
        assert_eq!(controller.state(), SessionState::Draining);

        // Two chunks, two canned segments each, in chunk order.
        assert_eq!(buffer.len(), 4);
        let texts: Vec<String> = buffer.get_segments().into_iter().map(|s| s.text).collect();
        assert_eq!(
            texts,
            vec!["This is a test.", "CLI mode.", "This is a test.", "CLI mode."]
        );
    }

    #[test]
    fn run_observes_stop_flag_within_poll_interval() {
        let dir = tempdir().unwrap();
        let buffer = Arc::new(TranscriptBuffer::new());
        let stop = StopFlag::new();
        let mut controller = SessionController::new(
            MockRecognizer::new(),
            buffer,
            stop.clone(),
            options(dir.path()),
        );

        let (_tx, rx) = unbounded::<AudioChunk>();
        let handle = thread::spawn(move || {
            controller.run(&rx);
            controller.state()
        });

        stop.request_stop();
        let state = handle.join().unwrap();
        assert_eq!(state, SessionState::Draining);
    }

    #[test]
    fn recognizer_failure_does_not_abort_the_loop() {
        let dir = tempdir().unwrap();
        let buffer = Arc::new(TranscriptBuffer::new());
        let mut controller = SessionController::new(
            MockRecognizer::new().with_failure(),
            Arc::clone(&buffer),
            StopFlag::new(),
            options(dir.path()),
        );

        let (tx, rx) = unbounded();
        for index in 1..=3 {
            tx.send(AudioChunk {
                index,
                samples: vec![0i16; 16],
            })
            .unwrap();
        }
        drop(tx);

        controller.run(&rx);
        assert_eq!(controller.state(), SessionState::Draining);
        assert!(buffer.is_empty());
    }

    #[test]
    fn chunk_files_removed_unless_keep_chunks() {
        let dir = tempdir().unwrap();
        let buffer = Arc::new(TranscriptBuffer::new());
        let mut opts = options(dir.path());
        let chunks_dir = opts.chunks_dir.clone();
        let mut controller = SessionController::new(
            MockRecognizer::new(),
            Arc::clone(&buffer),
            StopFlag::new(),
            opts.clone(),
        );

        let (tx, rx) = unbounded();
        tx.send(AudioChunk {
            index: 1,
            samples: vec![0i16; 16],
        })
        .unwrap();
        drop(tx);
        controller.run(&rx);
        assert!(!chunks_dir.join("chunk_001.wav").exists());

        // Same flow with keep_chunks retains the file.
        opts.keep_chunks = true;
        let mut controller =
            SessionController::new(MockRecognizer::new(), buffer, StopFlag::new(), opts);
        let (tx, rx) = unbounded();
        tx.send(AudioChunk {
            index: 2,
            samples: vec![0i16; 16],
        })
        .unwrap();
        drop(tx);
        controller.run(&rx);
        assert!(chunks_dir.join("chunk_002.wav").exists());
    }

    #[test]
    fn finalize_drains_buffer_and_writes_transcript() {
        let dir = tempdir().unwrap();
        let buffer = Arc::new(TranscriptBuffer::new());
        buffer.append(vec![
            Segment::new("00:00:00.000", "00:00:01.000", "hello"),
            Segment::new("00:00:01.000", "00:00:02.000", "world"),
        ]);

        let mut controller = SessionController::new(
            MockRecognizer::new(),
            Arc::clone(&buffer),
            StopFlag::new(),
            options(dir.path()),
        );

        let out_dir = dir.path().join("out");
        let path = controller
            .finalize(&out_dir, "session", "txt", noon())
            .unwrap();

        assert_eq!(controller.state(), SessionState::Saved);
        assert!(buffer.is_empty(), "finalize hands segments off exactly once");

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.ends_with("hello world"));
    }

    #[test]
    fn finalize_with_unsupported_format_fails_without_state_change_to_saved() {
        let dir = tempdir().unwrap();
        let buffer = Arc::new(TranscriptBuffer::new());
        let mut controller = SessionController::new(
            MockRecognizer::new(),
            buffer,
            StopFlag::new(),
            options(dir.path()),
        );

        let result = controller.finalize(&dir.path().join("out"), "session", "xyz", noon());
        assert!(result.is_err());
        assert_ne!(controller.state(), SessionState::Saved);
    }

    #[test]
    fn abort_marks_session_aborted() {
        let dir = tempdir().unwrap();
        let mut controller = SessionController::new(
            MockRecognizer::new(),
            Arc::new(TranscriptBuffer::new()),
            StopFlag::new(),
            options(dir.path()),
        );
        controller.abort();
        assert_eq!(controller.state(), SessionState::Aborted);
    }

    #[test]
    fn join_texts_single_spaces() {
        let segments = vec![
            Segment::new("a", "b", "one"),
            Segment::new("c", "d", "two"),
            Segment::new("e", "f", "three"),
        ];
        assert_eq!(join_texts(&segments), "one two three");
        assert_eq!(join_texts(&[]), "");
    }
}
