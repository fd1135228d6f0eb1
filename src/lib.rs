//! # slirc-client
//!
//! A client-side IRC engine: line framing, message parsing, channel state,
//! mode decoding, SASL/NickServ authentication and ban-list retrieval.
//!
//! ## Features
//!
//! - Sans-IO [`Session`] that turns inbound lines into typed [`Event`]s
//! - Channel membership and topic tracking with RFC 1459 case mapping
//! - Mode delta decoding against configurable mode classes
//! - SASL PLAIN and NickServ authentication
//! - Optional Tokio [`Client`] with keepalive and delayed auto-join
//!
//! The session performs no I/O of its own. The `tokio` feature (on by
//! default) adds [`Client`], which owns the socket and drives a session.

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Driving a session by hand
//!
//! ```rust
//! use slirc_client::{ClientConfig, Event, Session};
//!
//! let mut session = Session::new(&ClientConfig::new("irc.example.net", "bot"));
//! session.start();
//! session.drain_outbound().for_each(drop);
//!
//! session.process(":bot!b@host JOIN #rust");
//! let events = session.process(":alice!a@host PRIVMSG #rust :hello bot");
//! if let Some(event @ Event::Privmsg(_)) = events.last() {
//!     session.reply(event, "hi alice");
//! }
//! let out: Vec<String> = session.drain_outbound().collect();
//! assert_eq!(out, vec!["PRIVMSG #rust :hi alice"]);
//! ```
//!
//! ### Decoding modes
//!
//! ```rust
//! use slirc_client::{mode, ModeOp, ServerOptions};
//!
//! let ops = mode::decode_line(":op MODE #c +o-b alice *!*@spam", &ServerOptions::default());
//! assert_eq!(ops, vec![
//!     ModeOp::add('o').with_value("alice"),
//!     ModeOp::remove('b').with_value("*!*@spam"),
//! ]);
//! ```

pub mod auth;
pub mod banlist;
pub mod casemap;
#[cfg(feature = "tokio")]
pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod isupport;
pub mod line;
pub mod message;
pub mod mode;
pub mod prefix;
pub mod response;
pub mod sasl;
pub mod session;
#[cfg(feature = "tokio")]
pub mod transport;

pub use self::auth::Auth;
pub use self::banlist::BanEntry;
pub use self::casemap::{irc_eq, irc_to_lower};
#[cfg(feature = "tokio")]
pub use self::client::{Client, ClientHandle};
pub use self::command::Command;
pub use self::config::{ChannelSpec, ClientConfig, ServerConfig, UserInfo};
pub use self::error::{ClientError, ConfigError, ProtocolError};
pub use self::event::{
    default_flow, DefaultHandler, DisconnectReason, Event, Flow, Handler, TextMessage,
};
pub use self::isupport::{ChanModes, PrefixSpec, ServerOptions};
pub use self::line::{LineFramer, Lines};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::Message;
pub use self::mode::{Direction, ModeOp};
pub use self::prefix::Prefix;
pub use self::session::{Channel, Session};
#[cfg(feature = "tokio")]
pub use self::transport::Transport;
