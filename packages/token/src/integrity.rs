//! CRC32 integrity suffix
//!
//! Detects truncation and accidental corruption only. CRC32 is unkeyed, so
//! anyone can recompute it; authenticity has to come from elsewhere.

use flate2::Crc;
use routable_common::base36;

/// Width of the checksum suffix, in base36 digits
pub const CHECKSUM_WIDTH: usize = 7;

/// CRC32 (IEEE) of `body`
#[must_use]
pub fn crc32(body: &str) -> u32 {
    let mut crc = Crc::new();
    crc.update(body.as_bytes());
    crc.sum()
}

/// Checksum of `body` as seven zero-padded base36 digits
#[must_use]
pub fn checksum(body: &str) -> String {
    base36::encode_padded(u64::from(crc32(body)), CHECKSUM_WIDTH)
}

/// Append the checksum to `body`
#[must_use]
pub fn append_checksum(body: String) -> String {
    let suffix = checksum(&body);
    let mut token = body;
    token.push_str(&suffix);
    token
}
