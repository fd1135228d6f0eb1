//! TCP transport for the client loop.

use std::io;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::error::ProtocolError;
use crate::line::{LineCodec, Lines};
use crate::session::Session;

/// A framed TCP connection to an IRC server.
#[derive(Debug)]
pub struct Transport {
    framed: Framed<TcpStream, LineCodec>,
}

impl Transport {
    /// Connect to `address:port`.
    pub async fn connect(address: &str, port: u16) -> io::Result<Self> {
        debug!(address, port, "connecting");
        let stream = TcpStream::connect((address, port)).await?;
        Ok(Self::tcp(stream))
    }

    /// Wrap an established stream.
    pub fn tcp(stream: TcpStream) -> Self {
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
        Self {
            framed: Framed::new(stream, LineCodec::new()),
        }
    }

    fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
        use socket2::{SockRef, TcpKeepalive};

        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));
        sock.set_tcp_keepalive(&keepalive)
    }

    /// Read the next batch of complete lines.
    ///
    /// Returns `Ok(None)` once the peer has closed the connection.
    pub async fn read_lines(&mut self) -> Result<Option<Lines>, ProtocolError> {
        match self.framed.next().await {
            Some(Ok(lines)) => Ok(Some(lines)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    /// Write one line, CRLF appended.
    pub async fn write_line(&mut self, line: String) -> Result<(), ProtocolError> {
        self.framed.send(line).await
    }

    /// Write every line the session has queued, then flush.
    pub async fn flush_session(&mut self, session: &mut Session) -> Result<(), ProtocolError> {
        if !session.has_outbound() {
            return Ok(());
        }
        for line in session.drain_outbound() {
            self.framed.feed(line).await?;
        }
        self.framed.flush().await
    }
}
