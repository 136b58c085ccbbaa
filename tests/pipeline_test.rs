//! End-to-end pipeline tests: WAV input → slicer → session → transcript file.

use crossbeam_channel::unbounded;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;
use whisperlite::audio::source::AudioSource;
use whisperlite::audio::wav::{WavFileSource, encode_wav_bytes};
use whisperlite::audio::{AudioChunk, ChunkSlicer};
use whisperlite::session::{SessionController, SessionOptions, StopFlag};
use whisperlite::stt::MockRecognizer;
use whisperlite::transcript::{Segment, TranscriptBuffer};

fn write_wav_fixture(dir: &Path, seconds: f64) -> PathBuf {
    let path = dir.join("input.wav");
    let samples = vec![1000i16; (16000.0 * seconds) as usize];
    let bytes = encode_wav_bytes(&samples, 16000, 1).unwrap();
    fs::write(&path, bytes).unwrap();
    path
}

fn options(dir: &Path) -> SessionOptions {
    SessionOptions {
        chunks_dir: dir.join("chunks"),
        keep_chunks: false,
        sample_rate: 16000,
        channels: 1,
    }
}

/// Feed a WAV file through the slicer into a channel, the way the batch
/// composition root does, and return the number of full chunks produced.
fn drive_pipeline(
    input: &Path,
    recognizer: MockRecognizer,
    buffer: Arc<TranscriptBuffer>,
    session_dir: &Path,
    flush_partial: bool,
) -> (SessionController<MockRecognizer>, usize) {
    let mut source = WavFileSource::open(input, 16000).unwrap();
    let mut slicer = ChunkSlicer::new(1.5, 16000, 1);
    let mut controller =
        SessionController::new(recognizer, buffer, StopFlag::new(), options(session_dir));

    let (tx, rx) = unbounded::<AudioChunk>();
    source.start().unwrap();
    let mut chunks = 0usize;
    loop {
        let block = source.read_samples().unwrap();
        if block.is_empty() {
            break;
        }
        for chunk in slicer.push(&block) {
            chunks += 1;
            tx.send(chunk).unwrap();
        }
    }
    if flush_partial
        && let Some(tail) = slicer.finish()
    {
        chunks += 1;
        tx.send(tail).unwrap();
    }
    drop(tx);

    controller.run(&rx);
    (controller, chunks)
}

#[test]
fn file_pipeline_transcribes_every_full_chunk_in_order() {
    let dir = tempdir().unwrap();
    // 3.5s at 1.5s chunks → 2 full chunks plus a 0.5s remainder.
    let input = write_wav_fixture(dir.path(), 3.5);

    let buffer = Arc::new(TranscriptBuffer::new());
    let recognizer = MockRecognizer::new().with_segments(vec![Segment::new(
        "00:00:00.000",
        "00:00:01.500",
        "chunk text",
    )]);

    let (_controller, chunks) =
        drive_pipeline(&input, recognizer, Arc::clone(&buffer), dir.path(), false);

    assert_eq!(chunks, 2, "trailing partial is discarded by default");
    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.full_text(), "chunk text chunk text");
}

#[test]
fn file_pipeline_flush_partial_adds_trailing_chunk() {
    let dir = tempdir().unwrap();
    let input = write_wav_fixture(dir.path(), 3.5);

    let buffer = Arc::new(TranscriptBuffer::new());
    let recognizer =
        MockRecognizer::new().with_segments(vec![Segment::new("a", "b", "x")]);

    let (_controller, chunks) =
        drive_pipeline(&input, recognizer, Arc::clone(&buffer), dir.path(), true);

    assert_eq!(chunks, 3);
    assert_eq!(buffer.len(), 3);
}

#[test]
fn file_pipeline_finalize_writes_srt_and_drains_buffer() {
    let dir = tempdir().unwrap();
    let input = write_wav_fixture(dir.path(), 1.5);

    let buffer = Arc::new(TranscriptBuffer::new());
    let recognizer = MockRecognizer::new().with_segments(vec![Segment::new(
        "00:00:00.000",
        "00:00:01.500",
        "hello world",
    )]);

    let (mut controller, _) =
        drive_pipeline(&input, recognizer, Arc::clone(&buffer), dir.path(), false);

    let out_dir = dir.path().join("out");
    let path = controller
        .finalize(&out_dir, "session", "srt", chrono::Local::now())
        .unwrap();

    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("srt"));
    assert!(buffer.is_empty());

    let contents = fs::read_to_string(&path).unwrap();
    // SubRip uses comma millisecond separators; the writer rewrites the
    // recognizer's dot form on the way out.
    assert_eq!(
        contents,
        "1\n00:00:00,000 --> 00:00:01,500\nhello world\n\n"
    );
}

#[test]
fn file_pipeline_cleans_up_chunk_files() {
    let dir = tempdir().unwrap();
    let input = write_wav_fixture(dir.path(), 3.0);

    let buffer = Arc::new(TranscriptBuffer::new());
    let (_controller, chunks) = drive_pipeline(
        &input,
        MockRecognizer::new(),
        buffer,
        dir.path(),
        false,
    );

    assert_eq!(chunks, 2);
    let chunks_dir = dir.path().join("chunks");
    assert!(!chunks_dir.join("chunk_001.wav").exists());
    assert!(!chunks_dir.join("chunk_002.wav").exists());
}

#[test]
fn file_pipeline_bounded_buffer_keeps_newest_segments() {
    let dir = tempdir().unwrap();
    // 6s → 4 full chunks, one segment each.
    let input = write_wav_fixture(dir.path(), 6.0);

    let buffer = Arc::new(TranscriptBuffer::with_max_len(2));
    let recognizer =
        MockRecognizer::new().with_segments(vec![Segment::new("a", "b", "seg")]);

    let (_controller, chunks) =
        drive_pipeline(&input, recognizer, Arc::clone(&buffer), dir.path(), false);

    assert_eq!(chunks, 4);
    assert_eq!(buffer.len(), 2);
}

mod file_command {
    use super::*;
    use whisperlite::app::{RunOptions, run_file_command};
    use whisperlite::config::Config;

    /// The mock-recognizer variable is process-global; every test in this
    /// module sets it to the same value, so concurrent execution is safe.
    fn enable_mock_recognizer() {
        unsafe {
            std::env::set_var("WHISPERLITE_MOCK_RECOGNIZER", "1");
        }
    }

    /// Full composition-root run with the canned recognizer substituted via
    /// the environment override.
    #[test]
    fn run_file_command_end_to_end_with_mock_recognizer() {
        let dir = tempdir().unwrap();
        let input = write_wav_fixture(dir.path(), 3.0);
        enable_mock_recognizer();

        let mut config = Config::default();
        config.output.directory = Some(dir.path().join("out"));
        config.output.chunks_dir = dir.path().join("chunks");
        config.output.format = "json".to_string();

        let options = RunOptions {
            quiet: true,
            duration: None,
            flush_partial: false,
            output_name: Some("pipeline".to_string()),
        };

        let path = run_file_command(config, input, options).unwrap();
        assert!(path.ends_with("pipeline.json"));

        let contents = fs::read_to_string(&path).unwrap();
        let parsed: Vec<Segment> = serde_json::from_str(&contents).unwrap();
        // 2 chunks × 2 canned segments.
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed[0].text, "This is a test.");
    }

    /// Batch input is decoded to mono; a stereo live-capture setting must not
    /// double the chunk size or mislabel the chunk WAV headers.
    #[test]
    fn run_file_command_stereo_config_still_writes_mono_chunks() {
        let dir = tempdir().unwrap();
        let input = write_wav_fixture(dir.path(), 3.0);
        enable_mock_recognizer();

        let mut config = Config::default();
        config.audio.channels = 2;
        config.output.directory = Some(dir.path().join("out"));
        config.output.chunks_dir = dir.path().join("chunks");
        config.output.keep_chunks = true;

        let options = RunOptions {
            quiet: true,
            duration: None,
            flush_partial: false,
            output_name: Some("stereo".to_string()),
        };

        run_file_command(config, input, options).unwrap();

        // 3s of mono audio at 1.5s chunks → chunk_002 exists, chunk_003 not.
        let chunks_dir = dir.path().join("chunks");
        assert!(chunks_dir.join("chunk_002.wav").exists());
        assert!(!chunks_dir.join("chunk_003.wav").exists());

        let reader = hound::WavReader::open(chunks_dir.join("chunk_001.wav")).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), 24000, "1.5s at 16kHz, one channel");
    }
}
