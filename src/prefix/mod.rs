//! IRC message prefix (source) types.

use std::fmt;

use nom::{
    bytes::complete::take_till,
    character::complete::char,
    combinator::{opt, rest},
    sequence::preceded,
    IResult,
};

/// Host token used when a line arrives without a prefix.
pub const SERVER_ORIGIN: &str = "server";

/// The origin of a message: `nick!ident@host` or a bare server name.
///
/// A bare server name lands in `nick` with no ident or host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prefix {
    /// Nickname, or the server name for server-origin messages.
    pub nick: String,
    /// Ident (username), if present.
    pub ident: Option<String>,
    /// Hostname, if present.
    pub host: Option<String>,
    /// The full prefix without the leading `:`.
    pub raw: String,
}

fn split_prefix(input: &str) -> IResult<&str, (&str, Option<&str>, Option<&str>)> {
    let (input, nick) = take_till(|c| c == '!' || c == '@')(input)?;
    let (input, ident) = opt(preceded(char('!'), take_till(|c| c == '@')))(input)?;
    let (input, host) = opt(preceded(char('@'), rest))(input)?;
    Ok((input, (nick, ident, host)))
}

impl Prefix {
    /// Parse a prefix token. A single leading `:` is ignored.
    pub fn parse(s: &str) -> Self {
        let raw = s.strip_prefix(':').unwrap_or(s);
        match split_prefix(raw) {
            Ok((_, (nick, ident, host))) => Prefix {
                nick: nick.to_owned(),
                ident: ident.map(str::to_owned),
                host: host.map(str::to_owned),
                raw: raw.to_owned(),
            },
            Err(_) => Prefix {
                nick: raw.to_owned(),
                ident: None,
                host: None,
                raw: raw.to_owned(),
            },
        }
    }

    /// The prefix synthesized for lines that arrive without one.
    pub fn server_origin() -> Self {
        Self::parse(SERVER_ORIGIN)
    }

    /// Returns `true` if this prefix carries user components.
    pub fn is_user(&self) -> bool {
        self.ident.is_some() || self.host.is_some()
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
