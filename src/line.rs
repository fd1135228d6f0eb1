//! Line framing for the IRC byte stream.
//!
//! [`LineFramer`] accumulates raw chunks and releases lines only when the
//! buffered data, as a whole, ends in `\n`. A chunk that completes an
//! earlier line but leaves a partial line at its tail releases nothing;
//! everything stays buffered until a chunk ends on a terminator.
//!
//! Carriage returns are dropped on the way in, so `\r\n` and bare `\n`
//! terminators behave the same.

use bytes::{Bytes, BytesMut};

/// Accumulates raw bytes into newline-terminated lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: BytesMut,
}

impl LineFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
        }
    }

    /// Append a chunk and return the lines it releases.
    ///
    /// The returned iterator is empty unless the buffer now ends in a
    /// terminator, in which case it yields every buffered line in order and
    /// the buffer is emptied.
    pub fn push(&mut self, chunk: &[u8]) -> Lines {
        self.buffer
            .extend(chunk.iter().copied().filter(|&b| b != b'\r'));

        if self.buffer.last() == Some(&b'\n') {
            Lines::new(self.buffer.split().freeze())
        } else {
            Lines::default()
        }
    }

    /// Number of bytes held back waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Discard any buffered partial data.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Lazy sequence of lines released by [`LineFramer::push`].
///
/// Empty lines are skipped. Invalid UTF-8 is replaced rather than rejected.
#[derive(Clone, Debug, Default)]
pub struct Lines {
    data: Bytes,
    pos: usize,
}

impl Lines {
    fn new(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns `true` if no bytes were released.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }
}

impl Iterator for Lines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.pos < self.data.len() {
            let rest = &self.data[self.pos..];
            let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
            self.pos += end + 1;
            if end > 0 {
                return Some(String::from_utf8_lossy(&rest[..end]).into_owned());
            }
        }
        None
    }
}

#[cfg(feature = "tokio")]
pub use self::codec::LineCodec;

#[cfg(feature = "tokio")]
mod codec {
    use bytes::{BufMut, BytesMut};
    use tokio_util::codec::{Decoder, Encoder};

    use super::{LineFramer, Lines};
    use crate::error::ProtocolError;

    /// `tokio_util` codec wrapping a [`LineFramer`].
    ///
    /// Decoding yields one [`Lines`] batch per terminator-final read.
    /// Encoding appends CRLF to each outbound line.
    #[derive(Debug, Default)]
    pub struct LineCodec {
        framer: LineFramer,
    }

    impl LineCodec {
        /// Create a new codec with an empty framer.
        pub fn new() -> Self {
            Self {
                framer: LineFramer::new(),
            }
        }
    }

    impl Decoder for LineCodec {
        type Item = Lines;
        type Error = ProtocolError;

        fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Lines>, ProtocolError> {
            if src.is_empty() {
                return Ok(None);
            }
            let chunk = src.split();
            let lines = self.framer.push(&chunk);
            if lines.is_empty() {
                Ok(None)
            } else {
                Ok(Some(lines))
            }
        }
    }

    impl Encoder<String> for LineCodec {
        type Error = ProtocolError;

        fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), ProtocolError> {
            dst.reserve(line.len() + 2);
            dst.put_slice(line.as_bytes());
            dst.put_slice(b"\r\n");
            Ok(())
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_complete_line() {
        let mut framer = LineFramer::new();
        let lines: Vec<_> = framer.push(b":server 001 me :Welcome\r\n").collect();
        assert_eq!(lines, vec![":server 001 me :Welcome"]);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_partial_line_held_back() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.push(b"PING :abc").count(), 0);
        assert_eq!(framer.pending(), 9);
        let lines: Vec<_> = framer.push(b"\r\n").collect();
        assert_eq!(lines, vec!["PING :abc"]);
    }

    #[test]
    fn test_complete_line_not_released_before_terminal_newline() {
        let mut framer = LineFramer::new();
        // First line is complete but the buffer ends mid-line.
        assert_eq!(framer.push(b"LINE ONE x\r\nLINE TW").count(), 0);
        let lines: Vec<_> = framer.push(b"O x\r\n").collect();
        assert_eq!(lines, vec!["LINE ONE x", "LINE TWO x"]);
    }

    #[test]
    fn test_empty_lines_skipped() {
        let mut framer = LineFramer::new();
        let lines: Vec<_> = framer.push(b"\r\n\r\nA B C\n\n").collect();
        assert_eq!(lines, vec!["A B C"]);
    }

    #[test]
    fn test_carriage_returns_stripped_everywhere() {
        let mut framer = LineFramer::new();
        let lines: Vec<_> = framer.push(b"A\rB C\r\n").collect();
        assert_eq!(lines, vec!["AB C"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut framer = LineFramer::new();
        let lines: Vec<_> = framer.push(b"PRIVMSG #c :\xff\n").collect();
        assert_eq!(lines, vec!["PRIVMSG #c :\u{fffd}"]);
    }

    #[test]
    fn test_clear_discards_partial() {
        let mut framer = LineFramer::new();
        let _ = framer.push(b"partial");
        framer.clear();
        assert_eq!(framer.pending(), 0);
        let lines: Vec<_> = framer.push(b"next\n").collect();
        assert_eq!(lines, vec!["next"]);
    }
}
