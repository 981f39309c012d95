//! Token body encoding
//!
//! Body layout: `prefix || b64(payload || random || len(random)) || "." || marker`
//! where the marker is the base64 length as two zero-padded base36 digits.

use crate::entropy::EntropySource;
use crate::error::{Result, TokenError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use routable_common::base36;
use zeroize::Zeroizing;

/// Width of the encoded-length marker, in base36 digits
pub const LENGTH_MARKER_WIDTH: usize = 2;

/// Separator between the encoded payload and the length marker
pub const LENGTH_MARKER_SEPARATOR: char = '.';

/// Largest base64 payload length the marker can describe
#[must_use]
pub fn max_encoded_length() -> u64 {
    base36::max_for_width(LENGTH_MARKER_WIDTH as u32)
}

/// Length of the unpadded base64 encoding of `raw_len` bytes
#[must_use]
pub const fn encoded_length(raw_len: usize) -> usize {
    (raw_len / 3) * 4 + match raw_len % 3 {
        0 => 0,
        1 => 2,
        _ => 3,
    }
}

/// Encodes a checked payload into a prefixed token body
pub struct TokenEncoder<'a> {
    entropy: &'a dyn EntropySource,
    random_bytes_length: u8,
}

impl<'a> TokenEncoder<'a> {
    /// Encoder drawing `random_bytes_length` bytes per token from `entropy`
    #[must_use]
    pub fn new(entropy: &'a dyn EntropySource, random_bytes_length: u8) -> Self {
        Self {
            entropy,
            random_bytes_length,
        }
    }

    /// Encode `payload` under `prefix`, drawing a fresh random block.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::LengthMarkerOverflow`] if the base64 payload is
    /// too long for the two-digit marker.
    pub fn encode(&self, prefix: &str, payload: &str) -> Result<String> {
        let random_bytes = self
            .entropy
            .generate_bytes(usize::from(self.random_bytes_length));
        encode_with_random(prefix, payload, &random_bytes)
    }
}

/// Encode `payload` with a caller-chosen random block.
///
/// # Errors
///
/// Returns [`TokenError::LengthMarkerOverflow`] if the base64 payload is too
/// long for the two-digit marker. Random blocks longer than 255 bytes cannot
/// be described by the trailing length byte and are rejected the same way.
pub fn encode_with_random(prefix: &str, payload: &str, random_bytes: &[u8]) -> Result<String> {
    let random_len = u8::try_from(random_bytes.len()).map_err(|_| {
        TokenError::LengthMarkerOverflow {
            length: random_bytes.len(),
            max: u64::from(u8::MAX),
        }
    })?;

    let mut raw = Zeroizing::new(Vec::with_capacity(payload.len() + random_bytes.len() + 1));
    raw.extend_from_slice(payload.as_bytes());
    raw.extend_from_slice(random_bytes);
    raw.push(random_len);

    let encoded = URL_SAFE_NO_PAD.encode(raw.as_slice());
    let marker = length_marker(encoded.len())?;

    Ok(format!("{prefix}{encoded}{LENGTH_MARKER_SEPARATOR}{marker}"))
}

fn length_marker(length: usize) -> Result<String> {
    let max = max_encoded_length();
    match u64::try_from(length) {
        Ok(value) if value <= max => Ok(base36::encode_padded(value, LENGTH_MARKER_WIDTH)),
        _ => Err(TokenError::LengthMarkerOverflow { length, max }),
    }
}
