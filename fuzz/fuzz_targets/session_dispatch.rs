//! Fuzz target for session dispatch
//!
//! Every line is run through a live session; state updates must never
//! panic whatever the server sends.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::{ClientConfig, Session};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let mut session = Session::new(&ClientConfig::new("irc.example.net", "fuzz"));
    session.start();
    session.process(":fuzz!f@h JOIN #fuzz");
    session.request_ban_list("#fuzz", |_| {});
    for line in input.lines() {
        session.process(line);
    }
    session.drain_outbound().for_each(drop);
});
