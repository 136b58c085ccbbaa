//! Speech-to-text invocation layer.

pub mod recognizer;
pub mod whisper_cpp;

pub use recognizer::{MockRecognizer, Recognizer, mock_recognizer_requested};
pub use whisper_cpp::WhisperCppRecognizer;
