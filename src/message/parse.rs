//! Nom-based line parser.
//!
//! Parsing is soft: every input produces a [`Message`], with empty fields
//! where the line did not supply them.

use nom::{
    bytes::complete::take_till,
    character::complete::char,
    combinator::opt,
    error::{context, VerboseError},
    sequence::preceded,
    IResult,
};

use super::Message;
use crate::prefix::{Prefix, SERVER_ORIGIN};

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Marker separating positional parameters from the trailing parameter.
const TRAILING_MARKER: &str = " :";

fn parse_prefix(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing message prefix",
        preceded(char(':'), take_till(|c| c == ' ')),
    )(input)
}

fn parse_command(input: &str) -> ParseResult<&str, &str> {
    let (input, _) = opt(char(' '))(input)?;
    context("parsing command", take_till(|c| c == ' '))(input)
}

/// Parse one terminator-stripped line.
pub(super) fn parse_line(line: &str) -> Message {
    let line = line.trim_end_matches(['\r', '\n']);
    let raw = if line.starts_with(':') {
        line.to_owned()
    } else {
        format!(":{} {}", SERVER_ORIGIN, line)
    };

    let arity = raw.split(' ').count();

    let (head, trailing) = match raw.find(TRAILING_MARKER) {
        Some(idx) if idx > 1 => (&raw[..idx], Some(&raw[idx + TRAILING_MARKER.len()..])),
        _ => (raw.as_str(), None),
    };

    let (prefix, command, rest) = match parse_prefix(head) {
        Ok((input, prefix)) => match parse_command(input) {
            Ok((rest, command)) => (prefix, command, rest),
            Err(_) => (prefix, "", ""),
        },
        Err(_) => ("", "", ""),
    };

    let mut params: Vec<String> = match rest.strip_prefix(' ') {
        Some(rest) => rest.split(' ').map(str::to_owned).collect(),
        None => Vec::new(),
    };
    if let Some(text) = trailing {
        params.push(text.to_owned());
    }

    Message {
        prefix: Prefix::parse(prefix),
        command: command.to_owned(),
        params,
        has_trailing: trailing.is_some(),
        arity,
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_command() {
        let (rest, prefix) = parse_prefix(":nick!u@h PRIVMSG #c").unwrap();
        assert_eq!(prefix, "nick!u@h");
        let (rest, command) = parse_command(rest).unwrap();
        assert_eq!(command, "PRIVMSG");
        assert_eq!(rest, " #c");
    }

    #[test]
    fn test_missing_prefix_sigil_fails() {
        assert!(parse_prefix("PING x").is_err());
    }
}
