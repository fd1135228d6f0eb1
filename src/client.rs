//! Async client loop.
//!
//! [`Client::run`] connects, registers and then drives a single
//! `select!` loop over four sources:
//!
//! - inbound lines from the server,
//! - requests from [`ClientHandle`]s,
//! - the keepalive `PING` timer,
//! - the one-shot auto-join timer armed by `RPL_WELCOME`.
//!
//! Every event is handled on this loop, so session state is never touched
//! concurrently. Leaving the loop drops both timers.
//!
//! # Example
//!
//! ```no_run
//! use slirc_client::{Client, ClientConfig, Event, Flow, Session};
//!
//! # async fn demo() -> Result<(), slirc_client::ClientError> {
//! let config = ClientConfig::new("irc.libera.chat", "roar").with_channel("#rust");
//! let client = Client::new(config)?;
//!
//! client
//!     .run(|session: &mut Session, event: &Event| {
//!         if let Event::Privmsg(msg) = event {
//!             if msg.message == "!ping" {
//!                 session.reply(event, "pong");
//!             }
//!         }
//!         slirc_client::default_flow(event)
//!     })
//!     .await
//! # }
//! ```

use std::collections::BTreeSet;
use std::pin::Pin;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior, Sleep};
use tracing::{debug, info, warn};

use crate::banlist::BanEntry;
use crate::config::ClientConfig;
use crate::error::{ClientError, ConfigError};
use crate::event::{DisconnectReason, Event, Flow, Handler};
use crate::mode::ModeOp;
use crate::session::Session;
use crate::transport::Transport;

type Request = Box<dyn FnOnce(&mut Session) + Send>;

/// An IRC client bound to one server.
pub struct Client {
    config: ClientConfig,
    session: Session,
    requests: mpsc::UnboundedReceiver<Request>,
    sender: mpsc::UnboundedSender<Request>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client, rejecting incomplete configuration up front.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let session = Session::new(&config);
        let (sender, requests) = mpsc::unbounded_channel();
        Ok(Client {
            config,
            session,
            requests,
            sender,
        })
    }

    /// A handle for driving the client from other tasks.
    pub fn handle(&self) -> ClientHandle {
        ClientHandle {
            sender: self.sender.clone(),
        }
    }

    /// The session, before the client is started.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connect and run until the connection ends or the handler stops.
    ///
    /// Returns `Ok(())` when the connection ends and the handler chose to
    /// continue past the disconnect. If the handler returns
    /// [`Flow::Stop`], the stopping event is returned as an error; with the
    /// default handler, every disconnect therefore ends in `Err`.
    pub async fn run<H: Handler>(self, handler: H) -> Result<(), ClientError> {
        let transport =
            Transport::connect(&self.config.server.address, self.config.server.port).await?;
        self.run_on(transport, handler).await
    }

    /// Run over an already established transport.
    pub async fn run_on<H: Handler>(
        mut self,
        mut transport: Transport,
        mut handler: H,
    ) -> Result<(), ClientError> {
        info!(
            address = %self.config.server.address,
            port = self.config.server.port,
            nick = %self.session.nick(),
            "connected"
        );

        let connect = self.session.start();
        deliver(&mut self.session, &mut handler, vec![connect])?;
        transport.flush_session(&mut self.session).await?;

        let period = self.config.keepalive_interval;
        let mut keepalive = time::interval_at(Instant::now() + period, period);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let ping = format!("PING :{}", self.config.keepalive_token);

        let mut join_timer: Option<Pin<Box<Sleep>>> = None;

        loop {
            tokio::select! {
                read = transport.read_lines() => {
                    let lines = match read {
                        Ok(Some(lines)) => lines,
                        Ok(None) => {
                            return self.finish(&mut handler, DisconnectReason::SocketClosed);
                        }
                        Err(e) => {
                            warn!(error = %e, "read failed");
                            let reason = DisconnectReason::TransportError(e.to_string());
                            return self.finish(&mut handler, reason);
                        }
                    };
                    for line in lines {
                        let events = self.session.process(&line);
                        if let Err(e) = deliver(&mut self.session, &mut handler, events) {
                            // Best effort: let anything the handler queued go out.
                            let _ = transport.flush_session(&mut self.session).await;
                            return Err(e);
                        }
                        if !self.session.is_connected() {
                            break;
                        }
                        if self.session.take_autojoin() {
                            debug!(delay = ?self.config.channel_join_delay, "auto-join scheduled");
                            join_timer = Some(Box::pin(time::sleep(self.config.channel_join_delay)));
                        }
                    }
                }
                Some(request) = self.requests.recv() => {
                    request(&mut self.session);
                }
                _ = keepalive.tick() => {
                    if let Err(e) = transport.write_line(ping.clone()).await {
                        let reason = DisconnectReason::TransportError(e.to_string());
                        return self.finish(&mut handler, reason);
                    }
                }
                _ = async { if let Some(timer) = join_timer.as_mut() { timer.await } }, if join_timer.is_some() => {
                    join_timer = None;
                    self.session.autojoin();
                }
            }

            if let Err(e) = transport.flush_session(&mut self.session).await {
                let reason = DisconnectReason::TransportError(e.to_string());
                return self.finish(&mut handler, reason);
            }
            if !self.session.is_connected() {
                info!("session closed");
                return Ok(());
            }
        }
    }

    fn finish<H: Handler>(
        &mut self,
        handler: &mut H,
        reason: DisconnectReason,
    ) -> Result<(), ClientError> {
        match self.session.disconnect(reason) {
            Some(event) => deliver(&mut self.session, handler, vec![event]),
            None => Ok(()),
        }
    }
}

fn deliver<H: Handler>(
    session: &mut Session,
    handler: &mut H,
    events: Vec<Event>,
) -> Result<(), ClientError> {
    for event in events {
        if handler.handle(session, &event) == Flow::Stop {
            debug!(?event, "handler stopped the client");
            return Err(event.into_error());
        }
    }
    Ok(())
}

/// Cloneable remote control for a running [`Client`].
///
/// Requests are applied on the client loop in the order they were sent.
#[derive(Clone, Debug)]
pub struct ClientHandle {
    sender: mpsc::UnboundedSender<Request>,
}

impl ClientHandle {
    /// Run `f` against the session on the client loop.
    pub fn with_session<F>(&self, f: F) -> Result<(), ClientError>
    where
        F: FnOnce(&mut Session) + Send + 'static,
    {
        self.sender
            .send(Box::new(f))
            .map_err(|_| ClientError::Closed)
    }

    /// Run `f` against the session and wait for its result.
    pub async fn query<T, F>(&self, f: F) -> Result<T, ClientError>
    where
        F: FnOnce(&mut Session) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.with_session(move |session| {
            let _ = tx.send(f(session));
        })?;
        rx.await.map_err(|_| ClientError::Closed)
    }

    /// Queue a raw line.
    pub fn send_raw(&self, line: impl Into<String>) -> Result<(), ClientError> {
        let line = line.into();
        self.with_session(move |s| s.send_raw(line))
    }

    /// See [`Session::quit`].
    pub fn quit(&self, message: &str) -> Result<(), ClientError> {
        let message = message.to_owned();
        self.with_session(move |s| s.quit(&message))
    }

    /// See [`Session::send_message`].
    pub fn send_message(&self, target: &str, text: &str) -> Result<(), ClientError> {
        let (target, text) = (target.to_owned(), text.to_owned());
        self.with_session(move |s| s.send_message(&target, &text))
    }

    /// See [`Session::send_notice`].
    pub fn send_notice(&self, target: &str, text: &str) -> Result<(), ClientError> {
        let (target, text) = (target.to_owned(), text.to_owned());
        self.with_session(move |s| s.send_notice(&target, &text))
    }

    /// See [`Session::join_channel`].
    pub fn join_channel(&self, channel: &str, key: Option<&str>) -> Result<(), ClientError> {
        let channel = channel.to_owned();
        let key = key.map(str::to_owned);
        self.with_session(move |s| s.join_channel(&channel, key.as_deref()))
    }

    /// See [`Session::leave_channel`].
    pub fn leave_channel(&self, channel: &str, message: Option<&str>) -> Result<(), ClientError> {
        let channel = channel.to_owned();
        let message = message.map(str::to_owned);
        self.with_session(move |s| s.leave_channel(&channel, message.as_deref()))
    }

    /// See [`Session::kick_user`].
    pub fn kick_user(
        &self,
        channel: &str,
        nick: &str,
        message: Option<&str>,
    ) -> Result<(), ClientError> {
        let (channel, nick) = (channel.to_owned(), nick.to_owned());
        let message = message.map(str::to_owned);
        self.with_session(move |s| s.kick_user(&channel, &nick, message.as_deref()))
    }

    /// See [`Session::invite_user`].
    pub fn invite_user(&self, channel: &str, nick: &str) -> Result<(), ClientError> {
        let (channel, nick) = (channel.to_owned(), nick.to_owned());
        self.with_session(move |s| s.invite_user(&channel, &nick))
    }

    /// See [`Session::set_topic`].
    pub fn set_topic(&self, channel: &str, text: &str) -> Result<(), ClientError> {
        let (channel, text) = (channel.to_owned(), text.to_owned());
        self.with_session(move |s| s.set_topic(&channel, &text))
    }

    /// See [`Session::set_modes`].
    pub fn set_modes(&self, channel: &str, modes: Vec<ModeOp>) -> Result<(), ClientError> {
        let channel = channel.to_owned();
        self.with_session(move |s| s.set_modes(&channel, &modes))
    }

    /// See [`Session::channel_users`].
    pub async fn channel_users(&self, channel: &str) -> Result<BTreeSet<String>, ClientError> {
        let channel = channel.to_owned();
        self.query(move |s| s.channel_users(&channel)).await
    }

    /// See [`Session::channel_topic`].
    pub async fn channel_topic(&self, channel: &str) -> Result<String, ClientError> {
        let channel = channel.to_owned();
        self.query(move |s| s.channel_topic(&channel).to_owned()).await
    }

    /// Fetch a channel's ban list.
    ///
    /// Fails with [`ClientError::Cancelled`] if a later request replaces
    /// this one or the connection ends first.
    pub async fn ban_list(&self, channel: &str) -> Result<Vec<BanEntry>, ClientError> {
        let channel = channel.to_owned();
        let (tx, rx) = oneshot::channel();
        self.with_session(move |s| {
            s.request_ban_list(&channel, move |entries| {
                let _ = tx.send(entries);
            })
        })?;
        rx.await.map_err(|_| ClientError::Cancelled)
    }
}
