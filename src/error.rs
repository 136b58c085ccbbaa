//! Error types for whisperlite.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhisperLiteError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Recognizer errors (fatal at construction)
    #[error("Recognizer binary not found: {path}")]
    RecognizerNotFound { path: String },

    #[error("Model file not found: {path}")]
    ModelNotFound { path: String },

    // Per-chunk recognizer failures (callers treat these as recoverable)
    #[error("Recognizer invocation failed: {message}")]
    Invocation { message: String },

    // Transcript output errors
    #[error("Unsupported output format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to write transcript to {path}: {source}")]
    TranscriptWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, WhisperLiteError>;
