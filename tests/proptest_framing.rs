//! Property-based tests for line framing and message parsing.
//!
//! Uses proptest to verify that:
//! 1. Any chunking of a CRLF stream yields exactly the input lines
//! 2. No lines are released while the buffer lacks a final terminator
//! 3. Parsing never panics on arbitrary input

use proptest::prelude::*;
use slirc_client::{LineFramer, Message, ServerOptions};

// =============================================================================
// STRATEGIES
// =============================================================================

fn line_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("(:[a-z]{1,8} )?[A-Z]{1,8}( #[a-z]{1,8})?( :[a-z ]{0,16})?")
        .expect("valid regex")
}

fn stream_strategy() -> impl Strategy<Value = (Vec<String>, Vec<usize>)> {
    prop::collection::vec(line_strategy(), 1..8).prop_flat_map(|lines| {
        let len: usize = lines.iter().map(|l| l.len() + 2).sum();
        (Just(lines), prop::collection::vec(0..=len, 0..12))
    })
}

fn chunks<'a>(data: &'a [u8], mut cuts: Vec<usize>) -> Vec<&'a [u8]> {
    cuts.push(0);
    cuts.push(data.len());
    cuts.sort_unstable();
    cuts.dedup();
    cuts.windows(2).map(|w| &data[w[0]..w[1]]).collect()
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn framer_reassembles_any_split((lines, cuts) in stream_strategy()) {
        let wire: String = lines.iter().map(|l| format!("{}\r\n", l)).collect();
        let mut framer = LineFramer::new();
        let mut out = Vec::new();
        let mut fed = Vec::new();

        for chunk in chunks(wire.as_bytes(), cuts) {
            fed.extend_from_slice(chunk);
            let released: Vec<String> = framer.push(chunk).collect();
            if !fed.ends_with(b"\n") {
                prop_assert!(released.is_empty());
            }
            out.extend(released);
        }

        prop_assert_eq!(out, lines);
        prop_assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn framer_holds_unterminated_tail(line in line_strategy()) {
        let mut framer = LineFramer::new();
        let done: Vec<String> = framer.push(format!("{}\r\n{}", line, line).as_bytes()).collect();
        prop_assert!(done.is_empty());
        let done: Vec<String> = framer.push(b"\r\n").collect();
        prop_assert_eq!(done, vec![line.clone(), line]);
    }

    #[test]
    fn parse_never_panics(s in "\\PC{0,200}") {
        let msg = Message::parse(&s);
        let _ = mode_probe(&msg);
        prop_assert!(msg.arity() <= s.split(' ').count() + 1);
    }

    #[test]
    fn trailing_keeps_spaces(text in "[a-z]{1,5}( [a-z]{1,5}){0,4}") {
        let msg = Message::parse(&format!(":nick!u@h PRIVMSG #chan :{}", text));
        prop_assert_eq!(msg.trailing(), text.as_str());
        prop_assert_eq!(msg.arg(0), Some("#chan"));
    }
}

fn mode_probe(msg: &Message) -> usize {
    slirc_client::mode::decode(msg, &ServerOptions::default()).len()
}
