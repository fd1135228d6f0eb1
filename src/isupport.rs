//! Server-advertised channel options.
//!
//! [`ServerOptions`] carries the mode letter classes, membership prefixes
//! and channel sigils the session needs to decode MODE lines, NAMES
//! replies and message targets. It is fixed at construction; the values
//! can be written in `RPL_ISUPPORT` token syntax.

use crate::mode::Direction;

/// `CHANMODES` letter classes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChanModes {
    /// Type A: list modes, always take a value (`b`).
    pub list: String,
    /// Type B: always take a value (`k`).
    pub always: String,
    /// Type C: take a value only when set (`l`).
    pub on_set: String,
    /// Type D: boolean flags (`imnpstr`).
    pub flags: String,
}

impl ChanModes {
    /// Parse a `CHANMODES` value such as `b,k,l,imnpstr`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.splitn(4, ',');
        let (a, b, c, d) = (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
        Some(ChanModes {
            list: a.to_owned(),
            always: b.to_owned(),
            on_set: c.to_owned(),
            flags: d.to_owned(),
        })
    }
}

impl Default for ChanModes {
    fn default() -> Self {
        ChanModes {
            list: "b".to_owned(),
            always: "k".to_owned(),
            on_set: "l".to_owned(),
            flags: "imnpstr".to_owned(),
        }
    }
}

/// `PREFIX` membership modes and their display symbols.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrefixSpec {
    /// Mode letters, e.g. `ov`.
    pub modes: String,
    /// Symbols in the same order, e.g. `@+`.
    pub symbols: String,
}

impl PrefixSpec {
    /// Parse a `PREFIX` value such as `(ov)@+`.
    pub fn parse(s: &str) -> Option<Self> {
        let rest = s.strip_prefix('(')?;
        let (modes, symbols) = rest.split_once(')')?;
        if modes.is_empty() || modes.chars().count() != symbols.chars().count() {
            return None;
        }
        Some(PrefixSpec {
            modes: modes.to_owned(),
            symbols: symbols.to_owned(),
        })
    }
}

impl Default for PrefixSpec {
    fn default() -> Self {
        PrefixSpec {
            modes: "ov".to_owned(),
            symbols: "@+".to_owned(),
        }
    }
}

/// Channel options the session decodes against.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerOptions {
    /// Channel mode letter classes.
    pub chan_modes: ChanModes,
    /// Membership prefixes.
    pub prefix: PrefixSpec,
    /// Channel type sigils, e.g. `#`.
    pub chan_types: String,
}

impl Default for ServerOptions {
    fn default() -> Self {
        ServerOptions {
            chan_modes: ChanModes::default(),
            prefix: PrefixSpec::default(),
            chan_types: "#".to_owned(),
        }
    }
}

impl ServerOptions {
    /// Build options from `KEY=value` tokens, keeping defaults for
    /// anything missing or unparsable.
    ///
    /// Recognizes `CHANMODES`, `PREFIX` and `CHANTYPES`.
    pub fn from_isupport<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let mut options = ServerOptions::default();
        for token in tokens {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            match key.to_ascii_uppercase().as_str() {
                "CHANMODES" => {
                    if let Some(modes) = ChanModes::parse(value) {
                        options.chan_modes = modes;
                    }
                }
                "PREFIX" => {
                    if let Some(prefix) = PrefixSpec::parse(value) {
                        options.prefix = prefix;
                    }
                }
                "CHANTYPES" if !value.is_empty() => options.chan_types = value.to_owned(),
                _ => {}
            }
        }
        options
    }

    /// Strip leading membership symbols from a nick or target.
    pub fn strip_membership<'a>(&self, s: &'a str) -> &'a str {
        s.trim_start_matches(|c: char| self.prefix.symbols.contains(c))
    }

    /// Returns `true` if the target names a channel once membership
    /// symbols are stripped.
    pub fn is_channel(&self, target: &str) -> bool {
        self.strip_membership(target)
            .chars()
            .next()
            .is_some_and(|c| self.chan_types.contains(c))
    }

    /// Returns `true` if `letter` consumes a value token in `direction`.
    pub fn takes_value(&self, letter: char, direction: Direction) -> bool {
        let modes = &self.chan_modes;
        modes.list.contains(letter)
            || modes.always.contains(letter)
            || self.prefix.modes.contains(letter)
            || (direction == Direction::Add && modes.on_set.contains(letter))
    }
}
