//! Paginated ban-list retrieval.
//!
//! The collector has two states. A request moves it from idle to awaiting
//! and stores the caller's continuation. While awaiting, every
//! `RPL_BANLIST` line is kept verbatim; `RPL_ENDOFBANLIST` parses them,
//! calls the continuation once and returns to idle.
//!
//! Only one request is tracked. A second request while one is pending
//! replaces the earlier continuation, which is dropped uncalled.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::warn;

/// Continuation invoked with the collected ban list.
pub type BanListCallback = Box<dyn FnOnce(Vec<BanEntry>) + Send>;

/// One entry of a channel ban list.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BanEntry {
    /// Ban mask, e.g. `*!*@host`.
    pub mask: String,
    /// Who set the ban, if the server said.
    pub setter: Option<String>,
    /// Raw timestamp token, if the server sent one.
    pub timestamp: Option<String>,
}

impl BanEntry {
    /// Parse a raw `RPL_BANLIST` line.
    ///
    /// Fields are taken by position after splitting on spaces:
    /// `:server 367 <me> <channel> <mask> [<setter> [<time>]]`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split(' ').skip(4);
        let mask = fields.next().filter(|m| !m.is_empty())?;
        Some(BanEntry {
            mask: mask.to_owned(),
            setter: fields.next().map(str::to_owned),
            timestamp: fields.next().map(str::to_owned),
        })
    }

    /// The timestamp interpreted as unix seconds.
    pub fn set_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.timestamp.as_deref()?.parse::<i64>().ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

#[derive(Default)]
enum State {
    #[default]
    Idle,
    Awaiting {
        lines: Vec<String>,
        callback: BanListCallback,
    },
}

/// Single-slot ban-list accumulator.
#[derive(Default)]
pub struct BanListCollector {
    state: State,
}

impl fmt::Debug for BanListCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Idle => f.write_str("BanListCollector::Idle"),
            State::Awaiting { lines, .. } => f
                .debug_struct("BanListCollector::Awaiting")
                .field("lines", &lines.len())
                .finish(),
        }
    }
}

impl BanListCollector {
    /// Create an idle collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a request is outstanding.
    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, State::Awaiting { .. })
    }

    /// Start a request, replacing any pending continuation.
    pub fn begin(&mut self, callback: BanListCallback) {
        if self.is_awaiting() {
            warn!("ban list request replaces a pending one");
        }
        self.state = State::Awaiting {
            lines: Vec::new(),
            callback,
        };
    }

    /// Buffer one ban-list line. Ignored while idle.
    pub fn push(&mut self, raw: &str) {
        if let State::Awaiting { lines, .. } = &mut self.state {
            lines.push(raw.to_owned());
        }
    }

    /// Finish the request: parse buffered lines and call the continuation.
    ///
    /// Returns `false` if no request was outstanding.
    pub fn finish(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            State::Awaiting { lines, callback } => {
                let entries = lines.iter().filter_map(|l| BanEntry::parse(l)).collect();
                callback(entries);
                true
            }
            State::Idle => false,
        }
    }

    /// Drop any pending request without calling its continuation.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }
}
