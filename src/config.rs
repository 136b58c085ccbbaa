use crate::defaults;
use crate::error::{Result, WhisperLiteError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub recognizer: RecognizerConfig,
    pub output: OutputConfig,
}

/// Audio capture and slicing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub channels: u16,
    pub chunk_duration_secs: f64,
}

/// External recognizer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Explicit path to the whisper.cpp binary. None → search PATH.
    pub binary: Option<PathBuf>,
    pub model: PathBuf,
    pub language: String,
    pub timeout_secs: u64,
}

/// Transcript output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination directory. None → ~/Downloads.
    pub directory: Option<PathBuf>,
    pub format: String,
    /// Bound on retained segments. None → unbounded.
    pub max_segments: Option<usize>,
    /// Keep intermediate chunk WAV files after transcription.
    pub keep_chunks: bool,
    pub chunks_dir: PathBuf,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            channels: defaults::CHANNELS,
            chunk_duration_secs: defaults::CHUNK_DURATION_SECS,
        }
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            binary: None,
            model: PathBuf::from("models/ggml-tiny.en.bin"),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            timeout_secs: defaults::RECOGNIZER_TIMEOUT.as_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            format: "txt".to_string(),
            max_segments: None,
            keep_chunks: false,
            chunks_dir: PathBuf::from(defaults::CHUNKS_DIR),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// A missing file is `ConfigFileNotFound`; invalid TOML is `Config`.
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                WhisperLiteError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                WhisperLiteError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file is missing.
    ///
    /// Invalid TOML is still an error; only a missing file falls back.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(WhisperLiteError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - WHISPERLITE_MODEL → recognizer.model
    /// - WHISPERLITE_LANGUAGE → recognizer.language
    /// - WHISPERLITE_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("WHISPERLITE_MODEL")
            && !model.is_empty()
        {
            self.recognizer.model = PathBuf::from(model);
        }

        if let Ok(language) = std::env::var("WHISPERLITE_LANGUAGE")
            && !language.is_empty()
        {
            self.recognizer.language = language;
        }

        if let Ok(device) = std::env::var("WHISPERLITE_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        self
    }
}
