//! Error types for the IRC client engine.
//!
//! This module defines errors for the transport layer, construction-time
//! configuration mistakes, and the fatal outcomes of a client connection.

use thiserror::Error;

use crate::event::DisconnectReason;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Errors raised by the line codec.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Programmer errors detected eagerly when a client is constructed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// No server address was configured.
    #[error("invalid or missing server information")]
    MissingServerAddress,

    /// The server port was zero.
    #[error("invalid server port: {0}")]
    InvalidPort(u16),

    /// No nickname was configured.
    #[error("invalid or missing user information")]
    MissingNick,

    /// The keepalive interval was zero.
    #[error("keepalive interval must be non-zero")]
    ZeroKeepaliveInterval,
}

/// Fatal outcomes of a client connection.
///
/// These are delivered through [`Event::Error`](crate::Event::Error) and
/// [`Event::Disconnected`](crate::Event::Disconnected), and returned from
/// [`Client::run`](crate::Client::run) when the handler stops on them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// I/O error on the underlying socket.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The client configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The server rejected our SASL credentials.
    #[error("ERR_SASL_AUTH_FAIL")]
    SaslAuthFailed,

    /// The connection is gone.
    #[error("disconnected: {0}")]
    Disconnected(DisconnectReason),

    /// The handler stopped the client on a non-fatal event.
    #[error("stopped by event handler")]
    Stopped,

    /// The client loop is no longer running.
    #[error("client is not running")]
    Closed,

    /// A pending request was discarded before it completed.
    #[error("request cancelled")]
    Cancelled,
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(e) => Self::Io(e),
        }
    }
}

impl ClientError {
    /// Returns `true` if this error ended the connection.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnected(_) | Self::Io(_))
    }
}
