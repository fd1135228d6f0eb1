//! Registration and authentication flow.
//!
//! The variant is chosen once per connection:
//!
//! - [`Auth::None`]: plain `NICK`/`USER` registration.
//! - [`Auth::NickServ`]: identify to NickServ after `RPL_WELCOME`.
//! - [`Auth::SaslPlain`]: request the `sasl` capability during
//!   registration, answer the server's `AUTHENTICATE +` prompt with the
//!   PLAIN blob and close negotiation with `CAP END` on success.
//!
//! SASL failure is fatal; there is no retry or fallback.

use crate::message::Message;
use crate::sasl;

/// Capability requested for SASL authentication.
pub const SASL_CAP: &str = "sasl";

/// How the client authenticates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Auth {
    /// No extra exchange.
    #[default]
    None,
    /// `NICKSERV IDENTIFY` after welcome.
    NickServ {
        /// Account name.
        user: String,
        /// Password.
        password: String,
    },
    /// SASL PLAIN during registration.
    SaslPlain {
        /// Account name.
        user: String,
        /// Password.
        password: String,
    },
}

impl Auth {
    /// Returns `true` for the SASL variant.
    pub fn is_sasl(&self) -> bool {
        matches!(self, Auth::SaslPlain { .. })
    }

    /// Registration lines sent as soon as the transport connects.
    pub fn registration(&self, password: Option<&str>, nick: &str, username: &str) -> Vec<String> {
        let mut lines = Vec::with_capacity(4);
        if let Some(pass) = password {
            lines.push(format!("PASS :{}", pass));
        }
        if self.is_sasl() {
            lines.push(format!("CAP REQ :{}", SASL_CAP));
        }
        lines.push(format!("NICK {}", nick));
        lines.push(format!("USER {} * * :{}", username, username));
        lines
    }

    /// Line to send once `RPL_WELCOME` arrives.
    pub fn on_welcome(&self) -> Option<String> {
        match self {
            Auth::NickServ { user, password } => {
                Some(format!("NICKSERV IDENTIFY {} {}", user, password))
            }
            _ => None,
        }
    }

    /// Reply to a `CAP` message. Only an ACK of `sasl` is answered.
    pub fn on_cap(&self, msg: &Message) -> Option<String> {
        if !self.is_sasl() {
            return None;
        }
        let acked = msg
            .arg(1)
            .is_some_and(|sub| sub.eq_ignore_ascii_case("ACK"))
            && msg
                .arg(2)
                .is_some_and(|caps| caps.split(' ').any(|cap| cap.eq_ignore_ascii_case(SASL_CAP)));
        acked.then(|| format!("AUTHENTICATE {}", sasl::MECHANISM_PLAIN))
    }

    /// Reply to the server's `AUTHENTICATE` continuation prompt.
    pub fn on_authenticate(&self) -> Vec<String> {
        match self {
            Auth::SaslPlain { user, password } => {
                sasl::chunk_response(&sasl::encode_plain(user, password))
                    .into_iter()
                    .map(|chunk| format!("AUTHENTICATE {}", chunk))
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    /// Line to send on `RPL_SASL_AUTH`.
    pub fn on_sasl_success(&self) -> Option<String> {
        self.is_sasl().then(|| "CAP END".to_owned())
    }
}
