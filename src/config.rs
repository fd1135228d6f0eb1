//! Client configuration.
//!
//! # Example
//!
//! ```
//! use slirc_client::{Auth, ClientConfig};
//!
//! let config = ClientConfig::new("irc.libera.chat", "roar")
//!     .with_auth(Auth::NickServ { user: "roar".into(), password: "pw".into() })
//!     .with_channel("#rust")
//!     .with_keyed_channel("#secret", "hunter2");
//!
//! assert_eq!(config.server.port, 6667);
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use crate::auth::Auth;
use crate::error::ConfigError;
use crate::isupport::ServerOptions;

/// Default IRC port.
pub const DEFAULT_PORT: u16 = 6667;
/// Default username when none is configured.
pub const DEFAULT_USERNAME: &str = "default";
/// Default delay between welcome and auto-join.
pub const DEFAULT_CHANNEL_JOIN_DELAY: Duration = Duration::from_secs(5);
/// Default keepalive PING interval.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Where to connect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerConfig {
    /// Hostname or address.
    pub address: String,
    /// TCP port.
    pub port: u16,
    /// Server password sent with `PASS`.
    pub password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            address: String::new(),
            port: DEFAULT_PORT,
            password: None,
        }
    }
}

/// Who we are.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserInfo {
    /// Desired nickname.
    pub nick: String,
    /// Username (ident), also used as the real name.
    pub username: String,
    /// Authentication variant.
    pub auth: Auth,
}

impl Default for UserInfo {
    fn default() -> Self {
        UserInfo {
            nick: String::new(),
            username: DEFAULT_USERNAME.to_owned(),
            auth: Auth::None,
        }
    }
}

/// A channel to join after welcome.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelSpec {
    /// Channel name.
    pub name: String,
    /// Channel key, if any.
    pub key: Option<String>,
}

impl ChannelSpec {
    /// A channel without a key.
    pub fn new(name: impl Into<String>) -> Self {
        ChannelSpec {
            name: name.into(),
            key: None,
        }
    }
}

/// Everything needed to build a client.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientConfig {
    /// Server to connect to.
    pub server: ServerConfig,
    /// Identity.
    pub user: UserInfo,
    /// Channels joined after welcome.
    pub channels: Vec<ChannelSpec>,
    /// Channel options used for decoding.
    pub options: ServerOptions,
    /// Delay between `RPL_WELCOME` and the auto-join.
    pub channel_join_delay: Duration,
    /// Interval between keepalive PINGs.
    pub keepalive_interval: Duration,
    /// Token sent with keepalive PINGs.
    pub keepalive_token: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server: ServerConfig::default(),
            user: UserInfo::default(),
            channels: Vec::new(),
            options: ServerOptions::default(),
            channel_join_delay: DEFAULT_CHANNEL_JOIN_DELAY,
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            keepalive_token: "hello".to_owned(),
        }
    }
}

impl ClientConfig {
    /// A configuration for `address` with nickname `nick`.
    pub fn new(address: impl Into<String>, nick: impl Into<String>) -> Self {
        let mut config = ClientConfig::default();
        config.server.address = address.into();
        config.user.nick = nick.into();
        config
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    /// Set the server password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.server.password = Some(password.into());
        self
    }

    /// Set the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.user.username = username.into();
        self
    }

    /// Set the authentication variant.
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.user.auth = auth;
        self
    }

    /// Add a channel to the auto-join list.
    pub fn with_channel(mut self, name: impl Into<String>) -> Self {
        self.channels.push(ChannelSpec::new(name));
        self
    }

    /// Add a keyed channel to the auto-join list.
    pub fn with_keyed_channel(mut self, name: impl Into<String>, key: impl Into<String>) -> Self {
        self.channels.push(ChannelSpec {
            name: name.into(),
            key: Some(key.into()),
        });
        self
    }

    /// Set the channel options.
    pub fn with_options(mut self, options: ServerOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the auto-join delay.
    pub fn with_channel_join_delay(mut self, delay: Duration) -> Self {
        self.channel_join_delay = delay;
        self
    }

    /// Set the keepalive interval.
    pub fn with_keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval;
        self
    }

    /// Check the configuration for missing required fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.address.trim().is_empty() {
            return Err(ConfigError::MissingServerAddress);
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort(self.server.port));
        }
        if self.user.nick.trim().is_empty() {
            return Err(ConfigError::MissingNick);
        }
        if self.keepalive_interval.is_zero() {
            return Err(ConfigError::ZeroKeepaliveInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("irc.example.net", "roar");
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.user.username, DEFAULT_USERNAME);
        assert_eq!(config.user.auth, Auth::None);
        assert_eq!(config.channel_join_delay, Duration::from_secs(5));
        assert_eq!(config.keepalive_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            ClientConfig::new("", "roar").validate(),
            Err(ConfigError::MissingServerAddress)
        );
        assert_eq!(
            ClientConfig::new("irc.example.net", " ").validate(),
            Err(ConfigError::MissingNick)
        );
        assert_eq!(
            ClientConfig::new("irc.example.net", "roar").with_port(0).validate(),
            Err(ConfigError::InvalidPort(0))
        );
        assert_eq!(
            ClientConfig::new("irc.example.net", "roar")
                .with_keepalive_interval(Duration::ZERO)
                .validate(),
            Err(ConfigError::ZeroKeepaliveInterval)
        );
        assert!(ClientConfig::new("irc.example.net", "roar").validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::new("irc.example.net", "roar")
            .with_port(6697)
            .with_password("pw")
            .with_username("bot")
            .with_channel("#a")
            .with_keyed_channel("#b", "k");
        assert_eq!(config.server.port, 6697);
        assert_eq!(config.server.password.as_deref(), Some("pw"));
        assert_eq!(config.user.username, "bot");
        assert_eq!(config.channels[1].key.as_deref(), Some("k"));
    }
}
