//! Token decoding
//!
//! Reverses the encoder: verify the checksum, use the length marker to find
//! the base64 payload (everything in front of it is the prefix), strip the
//! random block and parse the routing lines.

use crate::encoder::{LENGTH_MARKER_SEPARATOR, LENGTH_MARKER_WIDTH};
use crate::error::DecodeError;
use crate::guard::{LINE_SEPARATOR, PAIR_SEPARATOR};
use crate::integrity::{self, CHECKSUM_WIDTH};
use crate::key::RoutingKey;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use routable_common::{base36, Base36Error};
use std::collections::BTreeMap;
use tracing::debug;

/// Shortest possible token: empty prefix, empty base64 payload
pub const MIN_TOKEN_LENGTH: usize = 1 + LENGTH_MARKER_WIDTH + CHECKSUM_WIDTH;

/// Contents of a decoded token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    prefix: String,
    payload: String,
    routing: BTreeMap<RoutingKey, String>,
    random_bytes: Vec<u8>,
}

impl DecodedToken {
    /// Prefix the token was minted with
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Plaintext routing payload
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Routing pairs by key
    #[must_use]
    pub fn routing(&self) -> &BTreeMap<RoutingKey, String> {
        &self.routing
    }

    /// Formatted value for `key`
    #[must_use]
    pub fn routing_value(&self, key: RoutingKey) -> Option<&str> {
        self.routing.get(&key).map(String::as_str)
    }

    /// Value for `key` read back as a base36 integer
    ///
    /// # Errors
    ///
    /// Returns the parse error when the value is not a base36 integer.
    pub fn decode_integer(&self, key: RoutingKey) -> Option<Result<i64, Base36Error>> {
        self.routing_value(key).map(base36::decode_i64)
    }

    /// Random block embedded in the token
    #[must_use]
    pub fn random_bytes(&self) -> &[u8] {
        &self.random_bytes
    }
}

/// Decode a token whose prefix is not known in advance.
///
/// # Errors
///
/// Returns a [`DecodeError`] describing the first structural problem found.
pub fn decode(token: &str) -> Result<DecodedToken, DecodeError> {
    decode_token(token).inspect_err(|err| debug!(error = %err, "Token decode failed"))
}

/// Decode a token and require a specific prefix.
///
/// # Errors
///
/// Returns [`DecodeError::PrefixMismatch`] on a different prefix, otherwise
/// the same errors as [`decode`].
pub fn decode_with_prefix(token: &str, prefix: &str) -> Result<DecodedToken, DecodeError> {
    let decoded = decode(token)?;
    if decoded.prefix != prefix {
        return Err(DecodeError::PrefixMismatch {
            expected: prefix.to_string(),
            actual: decoded.prefix,
        });
    }
    Ok(decoded)
}

fn decode_token(token: &str) -> Result<DecodedToken, DecodeError> {
    if !token.is_ascii() {
        return Err(DecodeError::NonAscii);
    }
    if token.len() < MIN_TOKEN_LENGTH {
        return Err(DecodeError::Truncated {
            length: token.len(),
            minimum: MIN_TOKEN_LENGTH,
        });
    }

    // ASCII only, so byte offsets are char boundaries.
    let (body, checksum) = token.split_at(token.len() - CHECKSUM_WIDTH);
    verify_checksum(body, checksum)?;

    let (rest, marker) = body.split_at(body.len() - LENGTH_MARKER_WIDTH);
    let rest = rest
        .strip_suffix(LENGTH_MARKER_SEPARATOR)
        .ok_or_else(|| DecodeError::MalformedLengthMarker(marker.to_string()))?;
    let encoded_len = base36::decode_u64(marker)
        .ok()
        .and_then(|len| usize::try_from(len).ok())
        .ok_or_else(|| DecodeError::MalformedLengthMarker(marker.to_string()))?;

    if encoded_len > rest.len() {
        return Err(DecodeError::Truncated {
            length: token.len(),
            minimum: token.len() + encoded_len - rest.len(),
        });
    }
    let (prefix, encoded) = rest.split_at(rest.len() - encoded_len);

    let raw = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|err| DecodeError::InvalidBase64(err.to_string()))?;
    let (payload, random_bytes) = split_random_block(&raw)?;
    let payload = std::str::from_utf8(payload).map_err(|_| DecodeError::InvalidUtf8)?;
    let routing = parse_routing_lines(payload)?;

    Ok(DecodedToken {
        prefix: prefix.to_string(),
        payload: payload.to_string(),
        routing,
        random_bytes: random_bytes.to_vec(),
    })
}

fn verify_checksum(body: &str, checksum: &str) -> Result<(), DecodeError> {
    base36::decode_u64(checksum).map_err(DecodeError::MalformedChecksum)?;

    let actual = integrity::checksum(body);
    if actual != checksum {
        return Err(DecodeError::ChecksumMismatch {
            expected: checksum.to_string(),
            actual,
        });
    }
    Ok(())
}

fn split_random_block(raw: &[u8]) -> Result<(&[u8], &[u8]), DecodeError> {
    let Some((&declared, rest)) = raw.split_last() else {
        return Err(DecodeError::InvalidRandomBlock {
            declared: 0,
            available: 0,
        });
    };
    let declared = usize::from(declared);
    if declared > rest.len() {
        return Err(DecodeError::InvalidRandomBlock {
            declared,
            available: rest.len(),
        });
    }
    Ok(rest.split_at(rest.len() - declared))
}

/// Parse newline-separated `key:value` lines into routing pairs.
///
/// Keys must be strictly ascending, which also rules out duplicates.
///
/// # Errors
///
/// Returns the offending line (1-based) for malformed pairs, unknown keys
/// and out-of-order keys.
pub fn parse_routing_lines(payload: &str) -> Result<BTreeMap<RoutingKey, String>, DecodeError> {
    let mut routing = BTreeMap::new();
    if payload.is_empty() {
        return Ok(routing);
    }

    let mut previous: Option<RoutingKey> = None;
    for (index, line) in payload.split(LINE_SEPARATOR).enumerate() {
        let line_no = index + 1;
        let (name, value) = line
            .split_once(PAIR_SEPARATOR)
            .ok_or(DecodeError::MalformedPair { line: line_no })?;
        if value.is_empty() {
            return Err(DecodeError::MalformedPair { line: line_no });
        }
        let key: RoutingKey = name.parse().map_err(|_| DecodeError::UnknownRoutingKey {
            key: name.to_string(),
            line: line_no,
        })?;
        if previous.is_some_and(|previous| previous >= key) {
            return Err(DecodeError::UnsortedPairs { line: line_no });
        }
        previous = Some(key);
        routing.insert(key, value.to_string());
    }

    Ok(routing)
}
