//! Sans-IO client session.
//!
//! A [`Session`] owns everything the client knows about its connection:
//! identity, channel membership, the ban-list collector and a queue of
//! outbound lines. It performs no I/O. Lines go in through
//! [`Session::process`], events come out, and outbound commands are
//! drained with [`Session::drain_outbound`].
//!
//! # Example
//!
//! ```
//! use slirc_client::{ClientConfig, Event, Session};
//!
//! let config = ClientConfig::new("irc.example.net", "roar").with_channel("#rust");
//! let mut session = Session::new(&config);
//!
//! let _connect = session.start();
//! let registration: Vec<String> = session.drain_outbound().collect();
//! assert_eq!(registration, vec!["NICK roar", "USER default * * :default"]);
//!
//! let events = session.process(":irc.example.net 001 roar :Welcome");
//! assert!(events.iter().any(|e| matches!(e, Event::Connected)));
//!
//! session.process(":roar!r@host JOIN #rust");
//! session.process(":irc.example.net 353 roar = #rust :@alice +bob roar");
//! assert!(session.channel_users("#rust").contains("alice"));
//! ```

mod dispatch;

use std::collections::{BTreeSet, HashMap, VecDeque};

use tracing::{debug, trace};

use crate::auth::Auth;
use crate::banlist::{BanEntry, BanListCollector};
use crate::casemap::{irc_eq, irc_to_lower};
use crate::config::{ChannelSpec, ClientConfig};
use crate::event::{DisconnectReason, Event};
use crate::isupport::ServerOptions;
use crate::message::Message;
use crate::mode::{self, ModeOp};

/// Maximum number of channels per auto-join `JOIN` line.
pub const MAX_JOIN_BATCH: usize = 10;

/// Default part message.
pub const DEFAULT_PART_MESSAGE: &str = "bye";

/// What the session knows about one joined channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    /// Current topic, empty if unset or unknown.
    pub topic: String,
    /// Member nicks with membership symbols stripped.
    pub users: BTreeSet<String>,
}

impl Channel {
    fn remove_user(&mut self, nick: &str) -> bool {
        let before = self.users.len();
        self.users.retain(|u| !irc_eq(u, nick));
        self.users.len() != before
    }
}

/// Client-side protocol state for one connection.
#[derive(Debug)]
pub struct Session {
    nick: String,
    username: String,
    auth: Auth,
    password: Option<String>,
    options: ServerOptions,
    autojoin: Vec<ChannelSpec>,
    channels: HashMap<String, Channel>,
    ban_list: BanListCollector,
    connected: bool,
    autojoin_armed: bool,
    outbound: VecDeque<String>,
}

impl Session {
    /// Create a session from a client configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Session {
            nick: config.user.nick.clone(),
            username: config.user.username.clone(),
            auth: config.user.auth.clone(),
            password: config.server.password.clone(),
            options: config.options.clone(),
            autojoin: config.channels.clone(),
            channels: HashMap::new(),
            ban_list: BanListCollector::new(),
            connected: false,
            autojoin_armed: false,
            outbound: VecDeque::new(),
        }
    }

    /// Our current nickname.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Our username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The authentication variant in use.
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// The channel options used for decoding.
    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Returns `true` between [`start`](Self::start) and a disconnect.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Returns `true` if `nick` is us.
    pub fn is_me(&self, nick: &str) -> bool {
        irc_eq(nick, &self.nick)
    }

    /// State for one channel, if we are in it.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&irc_to_lower(name))
    }

    /// Names (case-folded) of all tracked channels.
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    /// Members of a channel; empty if the channel is unknown.
    pub fn channel_users(&self, channel: &str) -> BTreeSet<String> {
        self.channel(channel)
            .map(|c| c.users.clone())
            .unwrap_or_default()
    }

    /// Topic of a channel; empty if the channel is unknown.
    pub fn channel_topic(&self, channel: &str) -> &str {
        self.channel(channel).map(|c| c.topic.as_str()).unwrap_or("")
    }

    /// Mark the transport connected and queue registration.
    pub fn start(&mut self) -> Event {
        self.connected = true;
        let lines = self
            .auth
            .registration(self.password.as_deref(), &self.nick, &self.username);
        for line in lines {
            self.send_raw(line);
        }
        Event::Connect
    }

    /// Parse and dispatch one inbound line.
    ///
    /// All state changes for the line are applied before the events are
    /// returned. The first event is always [`Event::RawData`]. Once the
    /// session is disconnected, lines are no longer dispatched and only
    /// the raw data event is returned.
    pub fn process(&mut self, line: &str) -> Vec<Event> {
        trace!(line, "<<");
        let mut events = vec![Event::RawData(line.to_owned())];
        if !self.connected {
            debug!("ignoring line on a disconnected session");
            return events;
        }
        self.dispatch(&Message::parse(line), &mut events);
        events
    }

    /// Tear down after the transport is gone.
    ///
    /// Channel state and any pending ban-list request are discarded; the
    /// ban-list continuation is not called. Returns the disconnect event if
    /// the session was connected.
    pub fn disconnect(&mut self, reason: DisconnectReason) -> Option<Event> {
        let was_connected = self.connected;
        self.teardown();
        was_connected.then(|| {
            debug!(%reason, "disconnected");
            Event::Disconnected(reason)
        })
    }

    fn teardown(&mut self) {
        self.connected = false;
        self.autojoin_armed = false;
        self.channels.clear();
        self.ban_list.reset();
    }

    /// Returns `true` once after welcome if an auto-join is due.
    pub fn take_autojoin(&mut self) -> bool {
        std::mem::take(&mut self.autojoin_armed)
    }

    /// Queue the batched JOIN lines for the configured channels.
    ///
    /// Does nothing once the session has disconnected.
    pub fn autojoin(&mut self) {
        if !self.connected {
            debug!("skipping auto-join on a disconnected session");
            return;
        }
        for line in join_batches(&self.autojoin) {
            self.send_raw(line);
        }
    }

    /// Take all queued outbound lines.
    pub fn drain_outbound(&mut self) -> std::collections::vec_deque::Drain<'_, String> {
        self.outbound.drain(..)
    }

    /// Returns `true` if outbound lines are waiting.
    pub fn has_outbound(&self) -> bool {
        !self.outbound.is_empty()
    }

    /// Queue a raw line (without CRLF).
    pub fn send_raw(&mut self, line: impl Into<String>) {
        let line = line.into();
        trace!(line = %redacted(&line), ">>");
        self.outbound.push_back(line);
    }

    /// `QUIT :message`
    pub fn quit(&mut self, message: &str) {
        self.send_raw(format!("QUIT :{}", message));
    }

    /// `PRIVMSG target :text`
    pub fn send_message(&mut self, target: &str, text: &str) {
        self.send_raw(format!("PRIVMSG {} :{}", target, text));
    }

    /// `NOTICE target :text`
    pub fn send_notice(&mut self, target: &str, text: &str) {
        self.send_raw(format!("NOTICE {} :{}", target, text));
    }

    /// Reply to an event that carries a reply target.
    ///
    /// Returns `false` if the event has nowhere to reply to.
    pub fn reply(&mut self, event: &Event, text: &str) -> bool {
        match event.reply_target() {
            Some(target) => {
                let target = target.to_owned();
                self.send_message(&target, text);
                true
            }
            None => false,
        }
    }

    /// `JOIN channel [key]`
    pub fn join_channel(&mut self, channel: &str, key: Option<&str>) {
        match key {
            Some(key) => self.send_raw(format!("JOIN {} {}", channel, key)),
            None => self.send_raw(format!("JOIN {}", channel)),
        }
    }

    /// `PART channel :message`, defaulting to `bye`.
    pub fn leave_channel(&mut self, channel: &str, message: Option<&str>) {
        let message = message.unwrap_or(DEFAULT_PART_MESSAGE);
        self.send_raw(format!("PART {} :{}", channel, message));
    }

    /// `KICK channel nick :message`, defaulting the reason to the nick.
    pub fn kick_user(&mut self, channel: &str, nick: &str, message: Option<&str>) {
        let message = message.unwrap_or(nick);
        self.send_raw(format!("KICK {} {} :{}", channel, nick, message));
    }

    /// `INVITE nick channel`
    pub fn invite_user(&mut self, channel: &str, nick: &str) {
        self.send_raw(format!("INVITE {} {}", nick, channel));
    }

    /// `TOPIC channel :text`
    pub fn set_topic(&mut self, channel: &str, text: &str) {
        self.send_raw(format!("TOPIC {} :{}", channel, text));
    }

    /// `MODE channel <modes> [values]`
    pub fn set_modes(&mut self, channel: &str, modes: &[ModeOp]) {
        if modes.is_empty() {
            return;
        }
        self.send_raw(format!("MODE {} {}", channel, mode::encode(modes)));
    }

    /// Request a channel's ban list; `callback` gets the full list once.
    ///
    /// Only one request is tracked at a time. A new request while one is
    /// pending replaces the earlier callback, which is never called.
    pub fn request_ban_list<F>(&mut self, channel: &str, callback: F)
    where
        F: FnOnce(Vec<BanEntry>) + Send + 'static,
    {
        self.ban_list.begin(Box::new(callback));
        self.send_raw(format!("MODE {} +b", channel));
    }

    /// Returns `true` while a ban-list request is outstanding.
    pub fn ban_list_pending(&self) -> bool {
        self.ban_list.is_awaiting()
    }
}

/// Mask credentials in an outbound line before it is logged.
fn redacted(line: &str) -> &str {
    let mut words = line.splitn(3, ' ');
    let command = words.next().unwrap_or_default();
    let arg = words.next().unwrap_or_default();
    if command.eq_ignore_ascii_case("PASS") {
        "PASS <redacted>"
    } else if command.eq_ignore_ascii_case("AUTHENTICATE") && arg != "PLAIN" && arg != "+" {
        "AUTHENTICATE <redacted>"
    } else if command.eq_ignore_ascii_case("NICKSERV") && arg.eq_ignore_ascii_case("IDENTIFY") {
        "NICKSERV IDENTIFY <redacted>"
    } else {
        line
    }
}

/// Build auto-join lines, at most [`MAX_JOIN_BATCH`] channels per line.
///
/// Keyed channels lead each batch so the key list lines up with them.
pub fn join_batches(channels: &[ChannelSpec]) -> Vec<String> {
    channels
        .chunks(MAX_JOIN_BATCH)
        .map(|batch| {
            let (keyed, open): (Vec<&ChannelSpec>, Vec<&ChannelSpec>) =
                batch.iter().partition(|c| c.key.is_some());
            let names: Vec<&str> = keyed
                .iter()
                .chain(open.iter())
                .map(|c| c.name.as_str())
                .collect();
            let keys: Vec<&str> = keyed.iter().filter_map(|c| c.key.as_deref()).collect();
            if keys.is_empty() {
                format!("JOIN {}", names.join(","))
            } else {
                format!("JOIN {} {}", names.join(","), keys.join(","))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ModeOp;
    use std::sync::{Arc, Mutex};

    fn session() -> Session {
        let mut s = Session::new(&ClientConfig::new("irc.example.net", "roar"));
        s.start();
        s.drain_outbound().for_each(drop);
        s
    }

    fn sent(s: &mut Session) -> Vec<String> {
        s.drain_outbound().collect()
    }

    #[test]
    fn test_start_queues_registration() {
        let config = ClientConfig::new("irc.example.net", "roar").with_password("pw");
        let mut s = Session::new(&config);
        assert!(!s.is_connected());
        assert!(matches!(s.start(), Event::Connect));
        assert!(s.is_connected());
        assert_eq!(
            sent(&mut s),
            vec!["PASS :pw", "NICK roar", "USER default * * :default"]
        );
    }

    #[test]
    fn test_outbound_commands() {
        let mut s = session();
        s.quit("later");
        s.send_message("#c", "hi there");
        s.send_notice("bob", "psst");
        s.join_channel("#c", None);
        s.join_channel("#k", Some("key"));
        s.leave_channel("#c", None);
        s.leave_channel("#k", Some("gone"));
        s.kick_user("#c", "troll", None);
        s.kick_user("#c", "troll", Some("out"));
        s.invite_user("#c", "friend");
        s.set_topic("#c", "new topic");
        assert_eq!(
            sent(&mut s),
            vec![
                "QUIT :later",
                "PRIVMSG #c :hi there",
                "NOTICE bob :psst",
                "JOIN #c",
                "JOIN #k key",
                "PART #c :bye",
                "PART #k :gone",
                "KICK #c troll :troll",
                "KICK #c troll :out",
                "INVITE friend #c",
                "TOPIC #c :new topic",
            ]
        );
    }

    #[test]
    fn test_set_modes() {
        let mut s = session();
        s.set_modes(
            "#c",
            &[
                ModeOp::add('b').with_value("*!*@*"),
                ModeOp::remove('o').with_value("bob"),
                ModeOp::add('m'),
            ],
        );
        s.set_modes("#c", &[]);
        assert_eq!(sent(&mut s), vec!["MODE #c +b-o+m *!*@* bob"]);
    }

    #[test]
    fn test_join_batches() {
        let channels: Vec<ChannelSpec> = (0..12).map(|i| ChannelSpec::new(format!("#c{}", i))).collect();
        let lines = join_batches(&channels);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "JOIN #c0,#c1,#c2,#c3,#c4,#c5,#c6,#c7,#c8,#c9");
        assert_eq!(lines[1], "JOIN #c10,#c11");

        let exact: Vec<ChannelSpec> = (0..10).map(|i| ChannelSpec::new(format!("#c{}", i))).collect();
        assert_eq!(join_batches(&exact).len(), 1);
        assert!(join_batches(&[]).is_empty());
    }

    #[test]
    fn test_join_batches_with_keys() {
        let channels = vec![
            ChannelSpec::new("#open"),
            ChannelSpec {
                name: "#locked".into(),
                key: Some("k1".into()),
            },
        ];
        assert_eq!(join_batches(&channels), vec!["JOIN #locked,#open k1"]);
    }

    #[test]
    fn test_unknown_channel_queries() {
        let s = session();
        assert!(s.channel_users("#nowhere").is_empty());
        assert_eq!(s.channel_topic("#nowhere"), "");
        assert!(s.channel("#nowhere").is_none());
    }

    #[test]
    fn test_redacted_masks_credentials() {
        assert_eq!(redacted("PASS :hunter2"), "PASS <redacted>");
        assert_eq!(redacted("NICKSERV IDENTIFY me pw"), "NICKSERV IDENTIFY <redacted>");
        assert_eq!(redacted("AUTHENTICATE dQB1AHA="), "AUTHENTICATE <redacted>");
        assert_eq!(redacted("AUTHENTICATE PLAIN"), "AUTHENTICATE PLAIN");
        assert_eq!(redacted("AUTHENTICATE +"), "AUTHENTICATE +");
        assert_eq!(redacted("PRIVMSG #c :hi"), "PRIVMSG #c :hi");
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_trace_output_has_no_secrets() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let config = ClientConfig::new("irc.example.net", "me")
                .with_password("SERVERPW")
                .with_auth(Auth::NickServ {
                    user: "me".into(),
                    password: "NSPASS".into(),
                });
            let mut s = Session::new(&config);
            s.start();
            s.process(":srv 001 me :hi");
            assert_eq!(
                sent(&mut s),
                vec![
                    "PASS :SERVERPW",
                    "NICK me",
                    "USER default * * :default",
                    "NICKSERV IDENTIFY me NSPASS",
                ]
            );
        });

        let out = String::from_utf8_lossy(&capture.0.lock().unwrap()).into_owned();
        assert!(out.contains("PASS <redacted>"));
        assert!(!out.contains("SERVERPW"));
        assert!(!out.contains("NSPASS"));
    }

    #[test]
    fn test_sasl_blob_not_traced() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let config = ClientConfig::new("irc.example.net", "me").with_auth(Auth::SaslPlain {
                user: "u".into(),
                password: "p".into(),
            });
            let mut s = Session::new(&config);
            s.start();
            s.process(":srv CAP * ACK :sasl");
            s.process("AUTHENTICATE +");
            assert!(sent(&mut s).contains(&"AUTHENTICATE dQB1AHA=".to_string()));
        });

        let out = String::from_utf8_lossy(&capture.0.lock().unwrap()).into_owned();
        assert!(out.contains("AUTHENTICATE PLAIN"));
        assert!(!out.contains("dQB1AHA="));
    }

    #[test]
    fn test_lines_after_self_quit_are_not_dispatched() {
        let mut s = session();
        s.process(":roar!r@h JOIN #a");
        s.process(":roar!r@h QUIT :bye");
        let events = s.process(":roar!r@h JOIN #x");
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::RawData(_)));
        assert!(s.channel("#x").is_none());
        assert!(!s.is_connected());
    }

    #[test]
    fn test_autojoin_skipped_after_disconnect() {
        let config = ClientConfig::new("irc.example.net", "roar").with_channel("#rust");
        let mut s = Session::new(&config);
        s.start();
        s.drain_outbound().for_each(drop);
        assert!(s.disconnect(DisconnectReason::SocketClosed).is_some());
        s.autojoin();
        assert!(!s.has_outbound());
        assert!(s.disconnect(DisconnectReason::SocketClosed).is_none());
    }
}
