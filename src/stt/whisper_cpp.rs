//! whisper.cpp subprocess invoker.
//!
//! One subprocess per chunk, with a hard timeout. The invoker owns the child
//! handle for its lifetime and kills it outright on expiry; the binary's
//! internals are opaque, so no cooperative signaling is attempted.

use crate::defaults;
use crate::error::{Result, WhisperLiteError};
use crate::stt::recognizer::Recognizer;
use crate::transcript::Segment;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Recognizer that shells out to whisper.cpp for each chunk.
pub struct WhisperCppRecognizer {
    binary: PathBuf,
    model: PathBuf,
    language: String,
    timeout: Duration,
}

impl WhisperCppRecognizer {
    /// Locate the binary and validate the model path.
    ///
    /// # Errors
    /// `RecognizerNotFound` if no binary is found (explicit path missing, or
    /// none of the known names on PATH); `ModelNotFound` if the model file
    /// does not exist. Both are fatal to starting a session.
    pub fn new(
        binary: Option<PathBuf>,
        model: PathBuf,
        language: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let binary = match binary {
            Some(path) => {
                if path.is_file() {
                    path
                } else {
                    let name = path.to_string_lossy().into_owned();
                    find_in_path(&[name.as_str()]).ok_or(WhisperLiteError::RecognizerNotFound {
                        path: name.clone(),
                    })?
                }
            }
            None => find_in_path(defaults::RECOGNIZER_BINARY_NAMES).ok_or_else(|| {
                WhisperLiteError::RecognizerNotFound {
                    path: defaults::RECOGNIZER_BINARY_NAMES.join("/"),
                }
            })?,
        };

        if !model.is_file() {
            return Err(WhisperLiteError::ModelNotFound {
                path: model.display().to_string(),
            });
        }

        Ok(Self {
            binary,
            model,
            language: language.into(),
            timeout,
        })
    }

    /// Path of the resolved binary.
    pub fn binary_path(&self) -> &Path {
        &self.binary
    }

    /// Run the subprocess for one chunk and collect its output.
    ///
    /// Returns `None` on timeout (child killed) or spawn failure.
    fn run_subprocess(&self, chunk: &Path) -> Option<(std::process::ExitStatus, String, String)> {
        let mut command = Command::new(&self.binary);
        command
            .arg("-m")
            .arg(&self.model)
            .arg("-f")
            .arg(chunk)
            .arg("--language")
            .arg(&self.language)
            .arg("--output-txt")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(binary = %self.binary.display(), error = %e, "failed to spawn recognizer");
                return None;
            }
        };

        // Drain both pipes off-thread so a chatty child can't deadlock
        // against the try_wait polling loop.
        let stdout_reader = child.stdout.take().map(spawn_pipe_reader);
        let stderr_reader = child.stderr.take().map(spawn_pipe_reader);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        warn!(chunk = %chunk.display(), "recognizer timed out, killing subprocess");
                        if let Err(e) = child.kill() {
                            warn!(error = %e, "failed to kill recognizer subprocess");
                        }
                        child.wait().ok();
                        return None;
                    }
                    thread::sleep(defaults::RECOGNIZER_POLL_INTERVAL);
                }
                Err(e) => {
                    warn!(error = %e, "failed to poll recognizer subprocess");
                    child.kill().ok();
                    child.wait().ok();
                    return None;
                }
            }
        };

        let stdout = join_pipe_reader(stdout_reader);
        let stderr = join_pipe_reader(stderr_reader);
        Some((status, stdout, stderr))
    }
}

impl Recognizer for WhisperCppRecognizer {
    /// Transcribe one chunk.
    ///
    /// Every per-chunk failure mode (missing chunk, spawn failure, timeout,
    /// non-zero exit, unparseable output) is logged and yields an empty
    /// segment list; the pipeline carries on.
    fn transcribe_chunk(&self, chunk: &Path) -> Result<Vec<Segment>> {
        if !chunk.is_file() {
            warn!(chunk = %chunk.display(), "chunk file not found, skipping");
            return Ok(Vec::new());
        }

        let Some((status, stdout, stderr)) = self.run_subprocess(chunk) else {
            return Ok(Vec::new());
        };

        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            debug!(target: "whisperlite::recognizer", "stderr: {}", line);
        }

        if !status.success() {
            warn!(chunk = %chunk.display(), %status, "recognizer exited with failure");
            return Ok(Vec::new());
        }

        Ok(parse_caption_output(&stdout))
    }

    fn is_ready(&self) -> bool {
        self.binary.is_file() && self.model.is_file()
    }
}

fn spawn_pipe_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut output = String::new();
        pipe.read_to_string(&mut output).ok();
        output
    })
}

fn join_pipe_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Search PATH for the first existing candidate binary.
fn find_in_path(names: &[&str]) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        for name in names {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Parse timed-caption output into segments.
///
/// Expected shape: repeated blocks of a `start --> end` timing line
/// immediately followed by one text line. Line-oriented and tolerant —
/// a malformed block is skipped with a warning and never discards valid
/// entries before or after it. Timestamps are copied verbatim.
pub fn parse_caption_output(output: &str) -> Vec<Segment> {
    let lines: Vec<&str> = output.lines().collect();
    let mut segments = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        if !line.contains(" --> ") {
            i += 1;
            continue;
        }

        let parts: Vec<&str> = line.split(" --> ").collect();
        if parts.len() != 2 || parts[0].trim().is_empty() || parts[1].trim().is_empty() {
            warn!(line, "skipping caption block with malformed timing line");
            i += 1;
            continue;
        }

        let text = lines.get(i + 1).map(|l| l.trim()).unwrap_or("");
        if text.is_empty() || text.contains(" --> ") {
            warn!(line, "skipping caption block without a text line");
            i += 1;
            continue;
        }

        segments.push(Segment::new(parts[0].trim(), parts[1].trim(), text));
        i += 2;
    }

    segments
}
