//! End-to-end session flows driven line by line.

use std::sync::{Arc, Mutex};

use slirc_client::{
    mode, Auth, BanEntry, ClientConfig, DisconnectReason, Event, ModeOp, ServerOptions, Session,
};

fn connected(config: ClientConfig) -> Session {
    let mut session = Session::new(&config);
    session.start();
    session.drain_outbound().for_each(drop);
    session
}

fn session() -> Session {
    connected(ClientConfig::new("irc.example.net", "me"))
}

fn sent(session: &mut Session) -> Vec<String> {
    session.drain_outbound().collect()
}

// =============================================================================
// Modes
// =============================================================================

#[test]
fn test_mode_values_follow_letters() {
    let ops = mode::decode_line(
        ":op!o@h MODE #c +ov-b nick nick *!*@host",
        &ServerOptions::default(),
    );
    assert_eq!(
        ops,
        vec![
            ModeOp::add('o').with_value("nick"),
            ModeOp::add('v').with_value("nick"),
            ModeOp::remove('b').with_value("*!*@host"),
        ]
    );
}

#[test]
fn test_mode_tokens_are_never_reused() {
    let ops = mode::decode_line("MODE #c +ov-b nick *!*@host", &ServerOptions::default());
    assert_eq!(
        ops,
        vec![
            ModeOp::add('o').with_value("nick"),
            ModeOp::add('v').with_value("*!*@host"),
            ModeOp::remove('b'),
        ]
    );
}

// =============================================================================
// Channel state
// =============================================================================

#[test]
fn test_self_join_then_names() {
    let mut s = session();
    let events = s.process(":me!u@h JOIN #test");
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::ChannelJoined { channel } if channel == "#test")));

    let chan = s.channel("#test").expect("channel tracked");
    assert_eq!(chan.topic, "");
    assert!(chan.users.is_empty());

    s.process(":srv 353 me = #test :@alice +bob carol");
    let users: Vec<String> = s.channel_users("#test").into_iter().collect();
    assert_eq!(users, vec!["alice", "bob", "carol"]);
}

#[test]
fn test_names_before_join_creates_channel() {
    let mut s = session();
    s.process(":srv 353 me @ #Quiet :dave");
    assert!(s.channel_users("#quiet").contains("dave"));
}

#[test]
fn test_channel_lookup_is_case_insensitive() {
    let mut s = session();
    s.process(":me!u@h JOIN #Rust[]");
    s.process(":srv 332 me #rust{} :systems");
    assert_eq!(s.channel_topic("#RUST[]"), "systems");
}

#[test]
fn test_quit_from_other_user_clears_membership() {
    let mut s = session();
    s.process(":me!u@h JOIN #a");
    s.process(":me!u@h JOIN #b");
    s.process(":srv 353 me = #a :alice bob");
    s.process(":srv 353 me = #b :alice carol");

    let events = s.process(":alice!a@h QUIT :Ping timeout");
    assert!(events.iter().any(|e| matches!(
        e,
        Event::UserQuit { user, message } if user.nick == "alice" && message == "Ping timeout"
    )));
    assert!(!s.channel_users("#a").contains("alice"));
    assert!(!s.channel_users("#b").contains("alice"));
    assert!(s.channel_users("#a").contains("bob"));
    assert!(s.is_connected());
}

#[test]
fn test_self_quit_clears_everything() {
    let mut s = session();
    s.process(":me!u@h JOIN #a");
    s.process(":srv 353 me = #a :alice");

    let events = s.process(":me!u@h QUIT :Client Quit");
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Disconnected(DisconnectReason::QuitFromServer)
    )));
    assert!(!s.is_connected());
    assert_eq!(s.channel_names().count(), 0);
}

#[test]
fn test_transactional_updates() {
    let mut s = session();
    s.process(":me!u@h JOIN #a");
    let events = s.process(":bob!b@h JOIN #a");
    // State is already updated when the events are returned.
    assert!(s.channel_users("#a").contains("bob"));
    assert!(matches!(events[0], Event::RawData(_)));
}

// =============================================================================
// Dispatch gating
// =============================================================================

#[test]
fn test_short_lines_are_dropped() {
    let mut s = session();
    for line in ["PING", "QUIT", ":me QUIT"] {
        let events = s.process(line);
        assert_eq!(events.len(), 1, "{} should only produce raw data", line);
    }
    assert!(s.is_connected());
    assert!(sent(&mut s).is_empty());
}

#[test]
fn test_unknown_commands_are_ignored() {
    let mut s = session();
    let events = s.process(":srv WALLOPS :hello");
    assert_eq!(events.len(), 1);
}

#[test]
fn test_numeric_without_error_name() {
    let mut s = session();
    let events = s.process(":srv 372 me :- motd line");
    assert_eq!(events.len(), 2);
    assert!(matches!(events[1], Event::Numeric { number: 372, .. }));
}

#[test]
fn test_error_numeric_is_named() {
    let mut s = session();
    let events = s.process(":srv 433 * me :Nickname is already in use");
    assert!(events.iter().any(|e| matches!(
        e,
        Event::ProtocolError { code: 433, name: "ERR_NICKNAMEINUSE", .. }
    )));
}

// =============================================================================
// Ban lists
// =============================================================================

#[test]
fn test_ban_list_round() {
    let mut s = session();
    let results: Arc<Mutex<Vec<Vec<BanEntry>>>> = Arc::default();

    let sink = Arc::clone(&results);
    s.request_ban_list("#c", move |list| sink.lock().unwrap().push(list));
    assert_eq!(sent(&mut s), vec!["MODE #c +b"]);
    assert!(s.ban_list_pending());

    s.process(":srv 367 me #c m1 op!o@h 1700000000");
    s.process(":srv 367 me #c m2 op!o@h 1700000001");
    s.process(":srv 368 me #c :End of Channel Ban List");
    assert!(!s.ban_list_pending());

    {
        let results = results.lock().unwrap();
        assert_eq!(results.len(), 1);
        let masks: Vec<&str> = results[0].iter().map(|e| e.mask.as_str()).collect();
        assert_eq!(masks, vec!["m1", "m2"]);
        assert_eq!(results[0][0].setter.as_deref(), Some("op!o@h"));
    }

    let sink = Arc::clone(&results);
    s.request_ban_list("#c", move |list| sink.lock().unwrap().push(list));
    s.process(":srv 368 me #c :End of Channel Ban List");
    let results = results.lock().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[1].is_empty());
}

#[test]
fn test_ban_list_lines_without_request_are_ignored() {
    let mut s = session();
    s.process(":srv 367 me #c m1 op 1");
    s.process(":srv 368 me #c :End");
    assert!(!s.ban_list_pending());
}

// =============================================================================
// Authentication
// =============================================================================

#[test]
fn test_sasl_payload() {
    let mut s = connected(
        ClientConfig::new("irc.example.net", "me").with_auth(Auth::SaslPlain {
            user: "u".into(),
            password: "p".into(),
        }),
    );
    s.process(":srv CAP * ACK :sasl");
    s.process("AUTHENTICATE +");
    let out = sent(&mut s);
    assert_eq!(out, vec!["AUTHENTICATE PLAIN", "AUTHENTICATE dQB1AHA="]);
}

#[test]
fn test_sasl_registration_order() {
    let config = ClientConfig::new("irc.example.net", "me")
        .with_password("serverpass")
        .with_auth(Auth::SaslPlain {
            user: "u".into(),
            password: "p".into(),
        });
    let mut s = Session::new(&config);
    s.start();
    assert_eq!(
        sent(&mut s),
        vec![
            "PASS :serverpass",
            "CAP REQ :sasl",
            "NICK me",
            "USER default * * :default"
        ]
    );
}

// =============================================================================
// Auto-join
// =============================================================================

#[test]
fn test_autojoin_batches() {
    let config = (0..25).fold(ClientConfig::new("irc.example.net", "me"), |c, i| {
        c.with_channel(format!("#c{}", i))
    });
    let mut s = connected(config);
    s.process(":srv 001 me :Welcome");
    assert!(s.take_autojoin());
    s.autojoin();
    let out = sent(&mut s);
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|l| l.starts_with("JOIN ")));
    assert_eq!(out[2], "JOIN #c20,#c21,#c22,#c23,#c24");
}

#[test]
fn test_autojoin_nothing_configured() {
    let mut s = session();
    s.process(":srv 001 me :Welcome");
    assert!(!s.take_autojoin());
}
