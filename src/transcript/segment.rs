//! Timestamped transcript segments.

use serde::{Deserialize, Serialize};

/// One timestamped span of recognized text returned by the recognizer.
///
/// Timestamps are kept in the recognizer's textual form (`HH:MM:SS.mmm`).
/// They are copied verbatim at the parse boundary; `start > end` is passed
/// through unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: String,
    pub end: String,
    pub text: String,
}

impl Segment {
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_serializes_with_stable_field_order() {
        let segment = Segment::new("00:00:00.000", "00:00:03.500", "Hello, this is a test.");
        let json = serde_json::to_string(&segment).unwrap();
        assert_eq!(
            json,
            r#"{"start":"00:00:00.000","end":"00:00:03.500","text":"Hello, this is a test."}"#
        );
    }

    #[test]
    fn segment_deserializes_from_json() {
        let json = r#"{"start":"00:00:04.100","end":"00:00:07.800","text":"Welcome to WhisperLite."}"#;
        let segment: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(segment.start, "00:00:04.100");
        assert_eq!(segment.end, "00:00:07.800");
        assert_eq!(segment.text, "Welcome to WhisperLite.");
    }
}
