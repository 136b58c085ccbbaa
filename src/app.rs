//! Application composition roots for live and file transcription.
//!
//! Wires capture/slicing, the recognizer, the transcript buffer, the
//! overlay and the writer into one session per invocation.

use crate::audio::slicer::ChunkSlicer;
use crate::audio::source::AudioSource;
use crate::audio::wav::WavFileSource;
use crate::config::Config;
use crate::error::{Result, WhisperLiteError};
use crate::session::{SessionController, SessionOptions, StopFlag};
use crate::stt::{MockRecognizer, Recognizer, WhisperCppRecognizer, mock_recognizer_requested};
use crate::transcript::{TranscriptBuffer, default_base_name};
use chrono::Local;
use crossbeam_channel::unbounded;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

/// Runtime options resolved from CLI + config.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub quiet: bool,
    /// Auto-stop after this long (live mode).
    pub duration: Option<Duration>,
    /// Flush the trailing partial chunk (file mode).
    pub flush_partial: bool,
    pub output_name: Option<String>,
}

/// Build the recognizer from config, honoring the mock-recognizer
/// environment override.
///
/// Construction failures (`RecognizerNotFound`, `ModelNotFound`) are fatal:
/// the session never starts.
pub fn build_recognizer(config: &Config) -> Result<Box<dyn Recognizer>> {
    if mock_recognizer_requested() {
        info!("mock recognizer enabled via environment, skipping whisper.cpp");
        return Ok(Box::new(MockRecognizer::new()));
    }

    let recognizer = WhisperCppRecognizer::new(
        config.recognizer.binary.clone(),
        config.recognizer.model.clone(),
        config.recognizer.language.clone(),
        Duration::from_secs(config.recognizer.timeout_secs),
    )?;
    info!(binary = %recognizer.binary_path().display(), "recognizer ready");
    Ok(Box::new(recognizer))
}

fn session_options(config: &Config) -> SessionOptions {
    SessionOptions {
        chunks_dir: config.output.chunks_dir.clone(),
        keep_chunks: config.output.keep_chunks,
        sample_rate: config.audio.sample_rate,
        channels: config.audio.channels,
    }
}

fn make_buffer(config: &Config) -> Arc<TranscriptBuffer> {
    match config.output.max_segments {
        Some(max) => Arc::new(TranscriptBuffer::with_max_len(max)),
        None => Arc::new(TranscriptBuffer::new()),
    }
}

fn resolve_output_dir(config: &Config) -> PathBuf {
    config
        .output
        .directory
        .clone()
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Run a live capture session: microphone → chunks → transcript file.
#[cfg(feature = "cpal-audio")]
pub fn run_live_command(config: Config, options: RunOptions) -> Result<PathBuf> {
    use crate::audio::capture::AudioCapture;
    use crate::overlay::{Overlay, spawn_stdin_stop};

    let recognizer = build_recognizer(&config)?;
    let buffer = make_buffer(&config);
    let stop = StopFlag::new();

    let mut capture = AudioCapture::new(
        config.audio.device.as_deref(),
        config.audio.sample_rate,
        config.audio.channels,
        config.audio.chunk_duration_secs,
    )?;
    if !options.quiet
        && let Some(name) = capture.device_name()
    {
        eprintln!("Using input device: {}", name);
    }

    let mut controller = SessionController::new(
        recognizer,
        Arc::clone(&buffer),
        stop.clone(),
        session_options(&config),
    );

    let (chunk_tx, chunk_rx) = unbounded();
    if let Err(e) = capture.start(chunk_tx) {
        controller.abort();
        return Err(e);
    }

    if !options.quiet {
        eprintln!("Capturing. Press Enter to stop.");
        Overlay::new(Arc::clone(&buffer), stop.clone()).spawn();
    }
    spawn_stdin_stop(stop.clone());

    if let Some(limit) = options.duration {
        let timer_stop = stop.clone();
        thread::spawn(move || {
            thread::sleep(limit);
            timer_stop.request_stop();
        });
    }

    // Worker loop on this thread; returns once the stop flag fires.
    controller.run(&chunk_rx);
    capture.stop();

    finalize(&mut controller, &config, &options)
}

/// Run a batch session: existing audio file → chunks → transcript file.
///
/// The file is re-chunked through the same slicer and per-chunk
/// transcription path as live capture.
pub fn run_file_command(config: Config, input: PathBuf, options: RunOptions) -> Result<PathBuf> {
    if !input.is_file() {
        return Err(WhisperLiteError::Other(format!(
            "Input file not found: {}",
            input.display()
        )));
    }

    let recognizer = build_recognizer(&config)?;
    let buffer = make_buffer(&config);
    let stop = StopFlag::new();

    let mut source = WavFileSource::open(&input, config.audio.sample_rate)?;

    // WavFileSource decodes to mono, so the slicer and the chunk WAV
    // headers are pinned to one channel regardless of the live-capture
    // channel setting.
    let mut slicer = ChunkSlicer::new(
        config.audio.chunk_duration_secs,
        config.audio.sample_rate,
        1,
    );
    let mut batch_options = session_options(&config);
    batch_options.channels = 1;

    let mut controller = SessionController::new(
        recognizer,
        Arc::clone(&buffer),
        stop.clone(),
        batch_options,
    );

    let (chunk_tx, chunk_rx) = unbounded();
    let flush_partial = options.flush_partial;
    let producer = thread::spawn(move || -> Result<()> {
        source.start()?;
        loop {
            let block = source.read_samples()?;
            if block.is_empty() {
                break;
            }
            for chunk in slicer.push(&block) {
                if chunk_tx.send(chunk).is_err() {
                    return Ok(());
                }
            }
        }
        if flush_partial
            && let Some(tail) = slicer.finish()
            && chunk_tx.send(tail).is_err()
        {
            return Ok(());
        }
        source.stop()?;
        Ok(())
        // chunk_tx drops here, disconnecting the worker loop
    });

    controller.run(&chunk_rx);

    match producer.join() {
        Ok(result) => result?,
        Err(_) => {
            return Err(WhisperLiteError::Other(
                "audio producer thread panicked".to_string(),
            ));
        }
    }

    finalize(&mut controller, &config, &options)
}

fn finalize(
    controller: &mut SessionController<Box<dyn Recognizer>>,
    config: &Config,
    options: &RunOptions,
) -> Result<PathBuf> {
    let now = Local::now();
    let base_name = options
        .output_name
        .clone()
        .unwrap_or_else(|| default_base_name(now));
    let output_dir = resolve_output_dir(config);

    let path = controller.finalize(&output_dir, &base_name, &config.output.format, now)?;
    println!("Transcript saved to {}", path.display());
    Ok(path)
}
