//! Events emitted by the session and the handler surface that receives them.
//!
//! Every event is delivered to a single [`Handler`], which answers with a
//! [`Flow`]. Disconnect and error events stop the client unless the
//! handler returns [`Flow::Continue`]; everything else continues by
//! default.

use std::fmt;

use tracing::warn;

use crate::error::ClientError;
use crate::mode::ModeOp;
use crate::prefix::Prefix;
use crate::session::Session;

/// Why a connection ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The transport closed while connected.
    SocketClosed,
    /// The server echoed our own QUIT.
    QuitFromServer,
    /// The transport failed.
    TransportError(String),
}

impl DisconnectReason {
    /// Numeric code: 0 socket closed, 1 quit, 2 transport error.
    pub fn code(&self) -> u8 {
        match self {
            DisconnectReason::SocketClosed => 0,
            DisconnectReason::QuitFromServer => 1,
            DisconnectReason::TransportError(_) => 2,
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::SocketClosed => f.write_str("socket closed"),
            DisconnectReason::QuitFromServer => f.write_str("quit from server"),
            DisconnectReason::TransportError(e) => write!(f, "transport error: {}", e),
        }
    }
}

/// A PRIVMSG or NOTICE.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMessage {
    /// Sender.
    pub from: Prefix,
    /// Destination with membership symbols stripped.
    pub to: String,
    /// Message text.
    pub message: String,
    /// Whether the destination is a channel.
    pub to_channel: bool,
    /// Where a reply should go: the destination channel, or the sender.
    pub reply_to: String,
}

/// Events delivered to the [`Handler`].
#[derive(Debug)]
#[non_exhaustive]
pub enum Event {
    /// The transport connected; registration has been queued.
    Connect,
    /// The connection ended. Channel state has been cleared.
    Disconnected(DisconnectReason),
    /// A raw inbound line, before dispatch.
    RawData(String),
    /// A PRIVMSG.
    Privmsg(TextMessage),
    /// A NOTICE.
    Notice(TextMessage),
    /// Any line whose command starts with digits.
    Numeric {
        /// Numeric value.
        number: u32,
        /// The line as dispatched.
        data: String,
    },
    /// Someone changed nick.
    NickChanged {
        /// Previous nick.
        old: String,
        /// New nick.
        new: String,
    },
    /// A MODE line was decoded.
    ModeChanged {
        /// Channel or nick the modes apply to.
        target: String,
        /// Who set the modes.
        setter: Prefix,
        /// Changes in the order they appeared.
        modes: Vec<ModeOp>,
    },
    /// `RPL_WELCOME` arrived.
    Connected,
    /// We joined a channel.
    ChannelJoined {
        /// Channel name as sent by the server.
        channel: String,
    },
    /// We left a channel.
    ChannelLeft {
        /// Channel name as sent by the server.
        channel: String,
    },
    /// A channel topic changed.
    ChannelTopicChanged {
        /// Channel name.
        channel: String,
        /// New topic.
        topic: String,
        /// Who changed it.
        user: Prefix,
    },
    /// Someone else joined a channel.
    UserJoined {
        /// Channel name.
        channel: String,
        /// Who joined.
        user: Prefix,
    },
    /// Someone else left a channel.
    UserLeft {
        /// Channel name.
        channel: String,
        /// Who left.
        user: Prefix,
        /// Part message.
        message: String,
    },
    /// Someone else quit.
    UserQuit {
        /// Who quit.
        user: Prefix,
        /// Quit message.
        message: String,
    },
    /// Someone was kicked.
    UserKicked {
        /// Channel name.
        channel: String,
        /// Kicked nick.
        user: String,
        /// Kicker nick.
        kicker: String,
        /// Kick reason.
        reason: String,
    },
    /// A fatal error.
    Error(ClientError),
    /// The server sent an error-class numeric.
    ProtocolError {
        /// Numeric code.
        code: u16,
        /// Canonical name, e.g. `ERR_NOSUCHNICK`.
        name: &'static str,
        /// The line as dispatched.
        data: String,
    },
}

impl Event {
    /// Returns `true` for events that stop the client by default.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::Disconnected(_) | Event::Error(_))
    }

    /// Where a reply to this event should be sent, if it has one.
    pub fn reply_target(&self) -> Option<&str> {
        match self {
            Event::Privmsg(m) | Event::Notice(m) => Some(&m.reply_to),
            Event::UserJoined { channel, .. } => Some(channel),
            _ => None,
        }
    }

    /// Convert a stopping event into the error returned by the client.
    pub fn into_error(self) -> ClientError {
        match self {
            Event::Error(err) => err,
            Event::Disconnected(reason) => ClientError::Disconnected(reason),
            _ => ClientError::Stopped,
        }
    }
}

/// What the client does after an event has been handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Keep running.
    Continue,
    /// Stop the client, returning the event as an error.
    Stop,
}

/// The default reaction to an event.
///
/// Protocol errors are logged. Disconnects and errors stop the client.
pub fn default_flow(event: &Event) -> Flow {
    match event {
        Event::ProtocolError { code, name, .. } => {
            warn!(code, name, "IRC protocol error");
            Flow::Continue
        }
        e if e.is_fatal() => Flow::Stop,
        _ => Flow::Continue,
    }
}

/// Receives session events.
///
/// The session is passed mutably so handlers can query channel state and
/// queue commands, including replies via [`Session::reply`].
pub trait Handler {
    /// Handle one event.
    fn handle(&mut self, session: &mut Session, event: &Event) -> Flow {
        let _ = session;
        default_flow(event)
    }
}

impl<F> Handler for F
where
    F: FnMut(&mut Session, &Event) -> Flow,
{
    fn handle(&mut self, session: &mut Session, event: &Event) -> Flow {
        self(session, event)
    }
}

/// A handler that only applies [`default_flow`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHandler;

impl Handler for DefaultHandler {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flow() {
        assert_eq!(default_flow(&Event::Connected), Flow::Continue);
        assert_eq!(
            default_flow(&Event::Disconnected(DisconnectReason::SocketClosed)),
            Flow::Stop
        );
        assert_eq!(default_flow(&Event::Error(ClientError::SaslAuthFailed)), Flow::Stop);
        assert_eq!(
            default_flow(&Event::ProtocolError {
                code: 401,
                name: "ERR_NOSUCHNICK",
                data: String::new(),
            }),
            Flow::Continue
        );
    }

    #[test]
    fn test_into_error() {
        let err = Event::Disconnected(DisconnectReason::QuitFromServer).into_error();
        assert!(matches!(
            err,
            ClientError::Disconnected(DisconnectReason::QuitFromServer)
        ));
        assert!(matches!(Event::Connected.into_error(), ClientError::Stopped));
    }

    #[test]
    fn test_disconnect_codes() {
        assert_eq!(DisconnectReason::SocketClosed.code(), 0);
        assert_eq!(DisconnectReason::QuitFromServer.code(), 1);
        assert_eq!(DisconnectReason::TransportError("reset".into()).code(), 2);
    }
}
