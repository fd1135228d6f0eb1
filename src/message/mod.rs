//! Parsed IRC lines.

mod parse;

use std::str::FromStr;

use crate::prefix::Prefix;

/// Minimum number of space-separated tokens for a line to be dispatched.
///
/// Counted after a server-origin prefix has been synthesized, so a bare
/// `PING` is dropped while `PING :token` is handled.
pub const MIN_DISPATCH_TOKENS: usize = 3;

/// One parsed protocol line.
///
/// `params` holds the positional parameters followed, when present, by the
/// trailing parameter (the text after the first `" :"`, spaces preserved).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Origin of the line. Synthesized as `server` when the line had none.
    pub prefix: Prefix,
    /// Command word or numeric code, as received.
    pub command: String,
    /// Positional parameters, then the trailing parameter if any.
    pub params: Vec<String>,
    /// Whether the last element of `params` is a trailing parameter.
    pub has_trailing: bool,
    /// The line as dispatched, including any synthesized prefix.
    pub raw: String,
    arity: usize,
}

impl Message {
    /// Parse one line. Never fails; malformed input yields empty fields.
    pub fn parse(line: &str) -> Self {
        parse::parse_line(line)
    }

    /// Returns `true` if the line has enough tokens to be dispatched.
    pub fn is_dispatchable(&self) -> bool {
        self.arity >= MIN_DISPATCH_TOKENS
    }

    /// Number of space-separated tokens in [`raw`](Self::raw).
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Parameter at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// The trailing parameter, or the empty string if there is none.
    pub fn trailing(&self) -> &str {
        if self.has_trailing {
            self.params.last().map(String::as_str).unwrap_or("")
        } else {
            ""
        }
    }

    /// Parameters before the trailing parameter.
    pub fn positional(&self) -> &[String] {
        let n = self.params.len() - usize::from(self.has_trailing);
        &self.params[..n]
    }

    /// The numeric value of the command, if it starts with digits.
    ///
    /// A digit run too large for a `u32` yields `None`.
    pub fn numeric(&self) -> Option<u32> {
        let digits = self
            .command
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 {
            return None;
        }
        self.command[..digits].parse().ok()
    }
}

impl FromStr for Message {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Message::parse(s))
    }
}
