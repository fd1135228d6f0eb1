//! Channel mode deltas.

mod parse;

pub use self::parse::{decode, decode_line, decode_modes};

use std::fmt;

/// Whether a mode is being set or unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// `+`
    #[default]
    Add,
    /// `-`
    Remove,
}

impl Direction {
    /// The sigil for this direction.
    pub fn sigil(self) -> char {
        match self {
            Direction::Add => '+',
            Direction::Remove => '-',
        }
    }
}

/// One atomic mode change.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeOp {
    /// Set or unset.
    pub direction: Direction,
    /// The mode letter.
    pub letter: char,
    /// The value consumed by this letter, if any.
    pub value: Option<String>,
}

impl ModeOp {
    /// `+letter` without a value.
    pub fn add(letter: char) -> Self {
        ModeOp {
            direction: Direction::Add,
            letter,
            value: None,
        }
    }

    /// `-letter` without a value.
    pub fn remove(letter: char) -> Self {
        ModeOp {
            direction: Direction::Remove,
            letter,
            value: None,
        }
    }

    /// Attach a value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ModeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.direction.sigil(), self.letter)?;
        if let Some(value) = &self.value {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}

/// Render mode changes as a MODE argument string.
///
/// Direction sigils are emitted whenever the direction changes, so values
/// stay in the same order as their letters: `+o-b+v a b c`.
pub fn encode(modes: &[ModeOp]) -> String {
    let mut letters = String::new();
    let mut values = String::new();
    let mut current = None;

    for op in modes {
        if current != Some(op.direction) {
            letters.push(op.direction.sigil());
            current = Some(op.direction);
        }
        letters.push(op.letter);
        if let Some(value) = &op.value {
            values.push(' ');
            values.push_str(value);
        }
    }

    letters.push_str(&values);
    letters
}
