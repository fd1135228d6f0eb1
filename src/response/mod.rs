//! Numeric reply classification.
//!
//! Maps three-digit reply codes to their canonical `RPL_*`/`ERR_*` names
//! and flags error-class replies by the `ERR_` naming convention.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>

mod names;

use self::names::NUMERIC_NAMES;

/// Prefix marking an error-class numeric name.
pub const ERROR_PREFIX: &str = "ERR_";

/// 001 - Welcome to the IRC network
pub const RPL_WELCOME: &str = "001";
/// 331 - No topic set
pub const RPL_NOTOPIC: &str = "331";
/// 332 - Channel topic
pub const RPL_TOPIC: &str = "332";
/// 353 - Names list entry
pub const RPL_NAMREPLY: &str = "353";
/// 367 - Ban list entry
pub const RPL_BANLIST: &str = "367";
/// 368 - End of ban list
pub const RPL_ENDOFBANLIST: &str = "368";
/// 903 - SASL authentication successful
pub const RPL_SASL_AUTH: &str = "903";
/// 904 - SASL authentication failed
pub const ERR_SASL_AUTH: &str = "904";

/// An error-class numeric reply resolved against the name table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumericError {
    /// Numeric code.
    pub code: u16,
    /// Canonical name, e.g. `ERR_NICKNAMEINUSE`.
    pub name: &'static str,
}

/// All canonical names registered for a three-digit code.
///
/// The match is on the exact token, so `"1"` does not resolve to `001`.
pub fn names(code: &str) -> impl Iterator<Item = &'static str> + '_ {
    let start = NUMERIC_NAMES.partition_point(|(c, _)| *c < code);
    NUMERIC_NAMES[start..]
        .iter()
        .take_while(move |(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// The first canonical name registered for a code.
pub fn name(code: &str) -> Option<&'static str> {
    names(code).next()
}

/// Code registered for a canonical name.
pub fn code(name: &str) -> Option<&'static str> {
    NUMERIC_NAMES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(c, _)| *c)
}

/// Returns `true` if `name` follows the error naming convention.
#[inline]
pub fn is_error_name(name: &str) -> bool {
    name.starts_with(ERROR_PREFIX)
}

/// Error-class names registered for a code, one entry per matching name.
pub fn errors(code: &str) -> impl Iterator<Item = NumericError> + '_ {
    let value = code.parse::<u16>().ok();
    names(code)
        .filter(|name| is_error_name(name))
        .filter_map(move |name| value.map(|code| NumericError { code, name }))
}
