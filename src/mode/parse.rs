//! MODE line decoding.

use super::{Direction, ModeOp};
use crate::isupport::ServerOptions;
use crate::message::Message;

/// Decode a mode string and its value tokens into ordered mode changes.
///
/// `pieces[0]` is the mode string; the rest are value tokens. `+` and `-`
/// switch direction (initially add) and `:` is ignored. A letter takes the
/// next unconsumed value token only if its class carries a value in the
/// current direction; a letter with no token left gets `None`. Surplus
/// tokens are ignored.
pub fn decode_modes(pieces: &[&str], options: &ServerOptions) -> Vec<ModeOp> {
    let Some((modestring, values)) = pieces.split_first() else {
        return Vec::new();
    };

    let mut values = values.iter();
    let mut direction = Direction::Add;
    let mut res = Vec::new();

    for c in modestring.chars() {
        match c {
            '+' => direction = Direction::Add,
            '-' => direction = Direction::Remove,
            ':' => {}
            letter => {
                let value = if options.takes_value(letter, direction) {
                    values.next().map(|v| (*v).to_owned())
                } else {
                    None
                };
                res.push(ModeOp {
                    direction,
                    letter,
                    value,
                });
            }
        }
    }

    res
}

/// Decode the mode changes carried by a parsed MODE message.
///
/// The first parameter is the target; everything after it, including the
/// words of a trailing parameter, is the mode string and its values.
pub fn decode(msg: &Message, options: &ServerOptions) -> Vec<ModeOp> {
    let positional = msg.positional();
    let mut pieces: Vec<&str> = positional.iter().skip(1).map(String::as_str).collect();
    if msg.has_trailing {
        let trailing = msg.trailing().split(' ').filter(|s| !s.is_empty());
        if positional.is_empty() {
            // The target itself arrived as the trailing parameter.
            pieces.extend(trailing.skip(1));
        } else {
            pieces.extend(trailing);
        }
    }
    decode_modes(&pieces, options)
}

/// Decode the full text of a MODE line.
pub fn decode_line(line: &str, options: &ServerOptions) -> Vec<ModeOp> {
    decode(&Message::parse(line), options)
}
