//! Per-message dispatch.

use tracing::{debug, info, trace};

use crate::casemap::irc_to_lower;
use crate::command::Command;
use crate::error::ClientError;
use crate::event::{DisconnectReason, Event, TextMessage};
use crate::message::Message;
use crate::mode;
use crate::response;

use super::{Channel, Session};

impl Session {
    /// Route a parsed message to the numeric classifier and the command
    /// handlers, appending resulting events to `events`.
    pub(super) fn dispatch(&mut self, msg: &Message, events: &mut Vec<Event>) {
        if !msg.is_dispatchable() {
            trace!(line = %msg.raw, "dropping short line");
            return;
        }

        if let Some(number) = msg.numeric() {
            events.push(Event::Numeric {
                number,
                data: msg.raw.clone(),
            });
        }
        for err in response::errors(&msg.command) {
            events.push(Event::ProtocolError {
                code: err.code,
                name: err.name,
                data: msg.raw.clone(),
            });
        }

        match Command::classify(&msg.command) {
            Command::Welcome => self.on_welcome(events),
            Command::SaslSuccess => {
                if let Some(line) = self.auth.on_sasl_success() {
                    self.send_raw(line);
                }
            }
            Command::SaslFailure => events.push(Event::Error(ClientError::SaslAuthFailed)),
            Command::NoTopic => {
                if let Some(chan) = msg.arg(1).and_then(|c| self.channel_mut(c)) {
                    chan.topic.clear();
                }
            }
            Command::TopicReply => {
                let topic = msg.trailing().to_owned();
                if let Some(chan) = msg.arg(1).and_then(|c| self.channel_mut(c)) {
                    chan.topic = topic;
                }
            }
            Command::NamesReply => self.on_names(msg),
            Command::BanList => self.ban_list.push(&msg.raw),
            Command::EndOfBanList => {
                if !self.ban_list.finish() {
                    trace!("end of ban list without a pending request");
                }
            }
            Command::Cap => {
                if let Some(line) = self.auth.on_cap(msg) {
                    self.send_raw(line);
                }
            }
            Command::Authenticate => {
                for line in self.auth.on_authenticate() {
                    self.send_raw(line);
                }
            }
            Command::Join => self.on_join(msg, events),
            Command::Part => self.on_part(msg, events),
            Command::Quit => self.on_quit(msg, events),
            Command::Kick => self.on_kick(msg, events),
            Command::Mode => events.push(Event::ModeChanged {
                target: msg.arg(0).unwrap_or_default().to_owned(),
                setter: msg.prefix.clone(),
                modes: mode::decode(msg, &self.options),
            }),
            Command::Nick => self.on_nick(msg, events),
            Command::Notice => events.push(Event::Notice(self.text_message(msg))),
            Command::Privmsg => events.push(Event::Privmsg(self.text_message(msg))),
            Command::Ping => {
                // Echo the token exactly as it arrived, colon included.
                if let Some(token) = msg.raw.split(' ').nth(2) {
                    self.send_raw(format!("PONG {}", token));
                }
            }
            Command::Topic => {
                let channel = msg.arg(0).unwrap_or_default().to_owned();
                let topic = free_text(msg);
                if let Some(chan) = self.channel_mut(&channel) {
                    chan.topic = topic.clone();
                }
                events.push(Event::ChannelTopicChanged {
                    channel,
                    topic,
                    user: msg.prefix.clone(),
                });
            }
            Command::Other => {}
        }
    }

    fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.get_mut(&irc_to_lower(name))
    }

    fn on_welcome(&mut self, events: &mut Vec<Event>) {
        info!(nick = %self.nick, "registered");
        events.push(Event::Connected);
        if let Some(line) = self.auth.on_welcome() {
            self.send_raw(line);
        }
        if !self.autojoin.is_empty() {
            self.autojoin_armed = true;
        }
    }

    fn on_names(&mut self, msg: &Message) {
        // :server 353 <me> <type> <channel> :<names>
        let Some(channel) = msg.arg(2) else {
            return;
        };
        let options = &self.options;
        let nicks: Vec<String> = msg
            .trailing()
            .split(' ')
            .map(|n| options.strip_membership(n))
            .filter(|n| !n.is_empty())
            .map(str::to_owned)
            .collect();
        self.channels
            .entry(irc_to_lower(channel))
            .or_default()
            .users
            .extend(nicks);
    }

    fn on_join(&mut self, msg: &Message, events: &mut Vec<Event>) {
        let channel = msg.arg(0).unwrap_or_default().to_owned();
        if self.is_me(&msg.prefix.nick) {
            debug!(%channel, "joined");
            self.channels
                .insert(irc_to_lower(&channel), Channel::default());
            events.push(Event::ChannelJoined { channel });
        } else {
            let nick = msg.prefix.nick.clone();
            if let Some(chan) = self.channel_mut(&channel) {
                chan.users.insert(nick);
            }
            events.push(Event::UserJoined {
                channel,
                user: msg.prefix.clone(),
            });
        }
    }

    fn on_part(&mut self, msg: &Message, events: &mut Vec<Event>) {
        let channel = msg.arg(0).unwrap_or_default().to_owned();
        if self.is_me(&msg.prefix.nick) {
            debug!(%channel, "left");
            self.channels.remove(&irc_to_lower(&channel));
            events.push(Event::ChannelLeft { channel });
        } else {
            if let Some(chan) = self.channel_mut(&channel) {
                chan.remove_user(&msg.prefix.nick);
            }
            events.push(Event::UserLeft {
                channel,
                user: msg.prefix.clone(),
                message: free_text(msg),
            });
        }
    }

    fn on_quit(&mut self, msg: &Message, events: &mut Vec<Event>) {
        if self.is_me(&msg.prefix.nick) {
            if let Some(event) = self.disconnect(DisconnectReason::QuitFromServer) {
                events.push(event);
            }
            return;
        }
        for chan in self.channels.values_mut() {
            chan.remove_user(&msg.prefix.nick);
        }
        events.push(Event::UserQuit {
            user: msg.prefix.clone(),
            message: msg.trailing().to_owned(),
        });
    }

    fn on_kick(&mut self, msg: &Message, events: &mut Vec<Event>) {
        // :kicker KICK <channel> <nick> [:reason]
        let channel = msg.arg(0).unwrap_or_default().to_owned();
        let user = msg.arg(1).unwrap_or_default().to_owned();
        if self.is_me(&user) {
            debug!(%channel, kicker = %msg.prefix.nick, "kicked");
            self.channels.remove(&irc_to_lower(&channel));
        } else if let Some(chan) = self.channel_mut(&channel) {
            chan.remove_user(&user);
        }
        let reason = if msg.params.len() > 2 {
            msg.trailing().to_owned()
        } else {
            String::new()
        };
        events.push(Event::UserKicked {
            channel,
            user,
            kicker: msg.prefix.nick.clone(),
            reason,
        });
    }

    fn on_nick(&mut self, msg: &Message, events: &mut Vec<Event>) {
        let old = msg.prefix.nick.clone();
        let new = msg.arg(0).unwrap_or_default().to_owned();
        if new.is_empty() {
            return;
        }
        if self.is_me(&old) {
            info!(%old, %new, "nick changed");
            self.nick = new.clone();
        }
        for chan in self.channels.values_mut() {
            if chan.remove_user(&old) {
                chan.users.insert(new.clone());
            }
        }
        events.push(Event::NickChanged { old, new });
    }

    fn text_message(&self, msg: &Message) -> TextMessage {
        let dest = msg.arg(0).unwrap_or_default();
        let to_channel = self.options.is_channel(dest);
        let to = self.options.strip_membership(dest).to_owned();
        let reply_to = if to_channel {
            to.clone()
        } else {
            msg.prefix.nick.clone()
        };
        TextMessage {
            from: msg.prefix.clone(),
            to,
            message: msg.arg(1).unwrap_or_default().to_owned(),
            to_channel,
            reply_to,
        }
    }
}

/// Text following the first parameter: the trailing part, or empty when
/// the only parameter arrived as trailing.
fn free_text(msg: &Message) -> String {
    if msg.has_trailing && msg.params.len() > 1 {
        msg.trailing().to_owned()
    } else {
        String::new()
    }
}
