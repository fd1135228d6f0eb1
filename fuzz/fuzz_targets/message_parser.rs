//! Fuzz target for line framing and message parsing
//!
//! Feeds arbitrary bytes through the framer, then parses and mode-decodes
//! every released line. None of it may panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::{mode, LineFramer, Message, ServerOptions};

fuzz_target!(|data: &[u8]| {
    let options = ServerOptions::default();
    let mut framer = LineFramer::new();
    let (head, tail) = data.split_at(data.len() / 2);

    for chunk in [head, tail, b"\n".as_slice()] {
        for line in framer.push(chunk) {
            let msg = Message::parse(&line);
            let _ = msg.numeric();
            let _ = mode::decode(&msg, &options);
        }
    }
});
