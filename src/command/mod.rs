//! The closed set of commands the dispatcher acts on.

use crate::response;

/// A command word or numeric the dispatcher handles.
///
/// Numerics are matched first by their exact three-digit code, then
/// command words case-insensitively. Anything else is [`Command::Other`]
/// and is dropped by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// `001` RPL_WELCOME
    Welcome,
    /// `903` RPL_SASL_AUTH
    SaslSuccess,
    /// `904` ERR_SASL_AUTH
    SaslFailure,
    /// `331` RPL_NOTOPIC
    NoTopic,
    /// `332` RPL_TOPIC
    TopicReply,
    /// `353` RPL_NAMREPLY
    NamesReply,
    /// `367` RPL_BANLIST
    BanList,
    /// `368` RPL_ENDOFBANLIST
    EndOfBanList,
    Cap,
    Authenticate,
    Join,
    Part,
    Quit,
    Kick,
    Mode,
    Nick,
    Notice,
    Privmsg,
    Ping,
    Topic,
    /// Anything not handled above.
    Other,
}

impl Command {
    /// Classify a command token.
    pub fn classify(token: &str) -> Self {
        match token {
            response::RPL_WELCOME => return Self::Welcome,
            response::RPL_SASL_AUTH => return Self::SaslSuccess,
            response::ERR_SASL_AUTH => return Self::SaslFailure,
            response::RPL_NOTOPIC => return Self::NoTopic,
            response::RPL_TOPIC => return Self::TopicReply,
            response::RPL_NAMREPLY => return Self::NamesReply,
            response::RPL_BANLIST => return Self::BanList,
            response::RPL_ENDOFBANLIST => return Self::EndOfBanList,
            _ => {}
        }

        match token.to_ascii_uppercase().as_str() {
            "CAP" => Self::Cap,
            "AUTHENTICATE" => Self::Authenticate,
            "JOIN" => Self::Join,
            "PART" => Self::Part,
            "QUIT" => Self::Quit,
            "KICK" => Self::Kick,
            "MODE" => Self::Mode,
            "NICK" => Self::Nick,
            "NOTICE" => Self::Notice,
            "PRIVMSG" => Self::Privmsg,
            "PING" => Self::Ping,
            "TOPIC" => Self::Topic,
            _ => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numerics() {
        assert_eq!(Command::classify("001"), Command::Welcome);
        assert_eq!(Command::classify("353"), Command::NamesReply);
        assert_eq!(Command::classify("368"), Command::EndOfBanList);
        assert_eq!(Command::classify("904"), Command::SaslFailure);
        assert_eq!(Command::classify("1"), Command::Other);
        assert_eq!(Command::classify("002"), Command::Other);
    }

    #[test]
    fn test_words_are_case_insensitive() {
        assert_eq!(Command::classify("PRIVMSG"), Command::Privmsg);
        assert_eq!(Command::classify("privmsg"), Command::Privmsg);
        assert_eq!(Command::classify("Ping"), Command::Ping);
        assert_eq!(Command::classify("WALLOPS"), Command::Other);
    }
}
