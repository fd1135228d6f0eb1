//! SASL PLAIN helpers.
//!
//! # Reference
//! - IRCv3 SASL: <https://ircv3.net/specs/extensions/sasl-3.1>
//! - RFC 4616 (PLAIN): <https://tools.ietf.org/html/rfc4616>

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Maximum length of a single AUTHENTICATE payload chunk.
pub const SASL_CHUNK_SIZE: usize = 400;

/// The mechanism name sent in `AUTHENTICATE PLAIN`.
pub const MECHANISM_PLAIN: &str = "PLAIN";

/// Encode PLAIN credentials as `base64(user NUL user NUL password)`.
///
/// The account name is used as both the authorization and the
/// authentication identity.
///
/// ```
/// use slirc_client::sasl::encode_plain;
///
/// assert_eq!(encode_plain("u", "p"), "dQB1AHA=");
/// ```
pub fn encode_plain(user: &str, password: &str) -> String {
    let payload = format!("{}\0{}\0{}", user, user, password);
    BASE64.encode(payload.as_bytes())
}

/// Split an encoded payload into AUTHENTICATE arguments.
///
/// Payloads are sent in 400-byte chunks. When the final chunk is exactly
/// 400 bytes (or the payload is empty) a lone `+` ends the exchange.
pub fn chunk_response(encoded: &str) -> Vec<String> {
    let mut chunks: Vec<String> = encoded
        .as_bytes()
        .chunks(SASL_CHUNK_SIZE)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();
    if encoded.len() % SASL_CHUNK_SIZE == 0 {
        chunks.push("+".to_owned());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_plain() {
        let decoded = BASE64.decode(encode_plain("u", "p")).unwrap();
        assert_eq!(decoded, b"u\0u\0p");
    }

    #[test]
    fn test_encode_plain_longer() {
        let decoded = BASE64.decode(encode_plain("roar", "hunter2")).unwrap();
        assert_eq!(decoded, b"roar\0roar\0hunter2");
    }

    #[test]
    fn test_short_payload_single_chunk() {
        let chunks = chunk_response("dQB1AHA=");
        assert_eq!(chunks, vec!["dQB1AHA="]);
    }

    #[test]
    fn test_long_payload_chunks() {
        let payload = "A".repeat(SASL_CHUNK_SIZE + 10);
        let chunks = chunk_response(&payload);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), SASL_CHUNK_SIZE);
        assert_eq!(chunks[1].len(), 10);
    }

    #[test]
    fn test_exact_multiple_ends_with_plus() {
        let payload = "A".repeat(SASL_CHUNK_SIZE);
        let chunks = chunk_response(&payload);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], "+");
        assert_eq!(chunk_response(""), vec!["+"]);
    }
}
