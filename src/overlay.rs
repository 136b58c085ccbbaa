//! Minimal terminal overlay for live transcripts.
//!
//! A thin display shell: it consumes read-only `full_text()` snapshots from
//! the transcript buffer on a fixed refresh timer and exposes a stop request.
//! The core pipeline never depends on anything here beyond those two points.

use crate::defaults;
use crate::session::StopFlag;
use crate::transcript::TranscriptBuffer;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Longest transcript tail shown on the status line.
const MAX_LINE_CHARS: usize = 120;

/// Live-updating status line on stderr.
pub struct Overlay {
    buffer: Arc<TranscriptBuffer>,
    stop: StopFlag,
}

impl Overlay {
    pub fn new(buffer: Arc<TranscriptBuffer>, stop: StopFlag) -> Self {
        Self { buffer, stop }
    }

    /// Spawn the refresh thread. Rewrites one stderr line every 500ms with
    /// the tail of the current transcript until the stop flag fires.
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || {
            while !self.stop.should_stop() {
                let text = self.buffer.full_text();
                eprint!("\r\x1b[2K{}", tail(&text, MAX_LINE_CHARS));
                io::stderr().flush().ok();
                thread::sleep(defaults::OVERLAY_REFRESH);
            }
            // Clear the status line on the way out.
            eprint!("\r\x1b[2K");
            io::stderr().flush().ok();
        })
    }
}

/// Spawn a thread that requests stop when the user presses Enter (or stdin
/// closes). Detached by design: a blocked stdin read dies with the process.
pub fn spawn_stdin_stop(stop: StopFlag) {
    thread::spawn(move || {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok();
        stop.request_stop();
    });
}

/// Last `max_chars` characters of `text`, on a char boundary.
fn tail(text: &str, max_chars: usize) -> &str {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        return text;
    }
    let skip = char_count - max_chars;
    match text.char_indices().nth(skip) {
        Some((byte_idx, _)) => &text[byte_idx..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Segment;

    #[test]
    fn tail_returns_short_text_unchanged() {
        assert_eq!(tail("hello", 10), "hello");
        assert_eq!(tail("", 10), "");
    }

    #[test]
    fn tail_truncates_to_last_chars() {
        assert_eq!(tail("abcdefgh", 3), "fgh");
    }

    #[test]
    fn tail_respects_multibyte_boundaries() {
        let text = "grüße welt";
        let t = tail(text, 4);
        assert_eq!(t, "welt");
    }

    #[test]
    fn overlay_thread_exits_on_stop() {
        let buffer = Arc::new(TranscriptBuffer::new());
        buffer.append(vec![Segment::new("a", "b", "hi")]);
        let stop = StopFlag::new();

        let handle = Overlay::new(buffer, stop.clone()).spawn();
        stop.request_stop();
        handle.join().unwrap();
    }
}
