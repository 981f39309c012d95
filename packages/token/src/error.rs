//! Error types for minting, decoding and configuring routable tokens

use crate::key::RoutingKey;
use routable_common::Base36Error;
use std::fmt;
use thiserror::Error;

/// Errors raised while minting a token
///
/// All of these are deterministic configuration or input errors; none are
/// worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// A required key is absent from the caller payload
    #[error(
        "Missing required routing keys: {}. Required routing keys: {}",
        KeyList(.missing),
        KeyList(.required)
    )]
    MissingRequiredRoutingKeys {
        /// Required keys that were not supplied
        missing: Vec<RoutingKey>,
        /// Every required key
        required: Vec<RoutingKey>,
    },

    /// The caller payload names keys outside the routing key set
    #[error(
        "Invalid routing keys: {}. Valid routing keys: {}",
        NameList(.invalid),
        KeyList(.valid)
    )]
    InvalidRoutingKeys {
        /// Rejected key names, as supplied
        invalid: Vec<String>,
        /// Accepted routing keys
        valid: Vec<RoutingKey>,
    },

    /// A value contains the line separator and would forge extra pairs
    #[error("Routing value for :{key} contains a line separator")]
    LineSeparatorInValue {
        /// Key whose value was rejected
        key: RoutingKey,
    },

    /// The serialized payload is over the byte budget
    #[error("Routing payload is too large: {size} bytes (maximum {max} bytes)")]
    PayloadTooLarge {
        /// Serialized payload size in bytes
        size: usize,
        /// Configured budget in bytes
        max: usize,
    },

    /// The encoded payload is too long for the two-digit length marker
    #[error("Encoded payload length {length} does not fit the length marker (maximum {max})")]
    LengthMarkerOverflow {
        /// Offending length
        length: usize,
        /// Largest describable length
        max: u64,
    },
}

/// Result type for minting operations
pub type Result<T> = std::result::Result<T, TokenError>;

/// Errors raised while decoding a token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Tokens are ASCII only
    #[error("token contains non-ASCII characters")]
    NonAscii,

    /// Too short to hold its own structure
    #[error("token is truncated: {length} characters, at least {minimum} expected")]
    Truncated {
        /// Actual token length
        length: usize,
        /// Length the structure requires
        minimum: usize,
    },

    /// Checksum suffix is not a base36 numeral
    #[error("malformed checksum: {0}")]
    MalformedChecksum(Base36Error),

    /// Checksum suffix does not match the body
    #[error("checksum mismatch: token carries {expected}, body hashes to {actual}")]
    ChecksumMismatch {
        /// Checksum carried by the token
        expected: String,
        /// Checksum computed over the body
        actual: String,
    },

    /// Length marker missing, misplaced or not base36
    #[error("malformed length marker {0:?}")]
    MalformedLengthMarker(String),

    /// Token carries a different prefix than required
    #[error("token prefix {actual:?} does not match {expected:?}")]
    PrefixMismatch {
        /// Required prefix
        expected: String,
        /// Prefix found in the token
        actual: String,
    },

    /// Payload is not unpadded base64url
    #[error("payload is not valid base64url: {0}")]
    InvalidBase64(String),

    /// Trailing length byte claims more random bytes than exist
    #[error("random block of {declared} bytes does not fit a {available}-byte payload")]
    InvalidRandomBlock {
        /// Length from the trailing byte
        declared: usize,
        /// Bytes in front of the trailing byte
        available: usize,
    },

    /// Plaintext payload is not UTF-8
    #[error("routing payload is not valid UTF-8")]
    InvalidUtf8,

    /// Line without a `key:value` pair or with an empty value
    #[error("malformed routing pair on line {line}")]
    MalformedPair {
        /// 1-based line number
        line: usize,
    },

    /// Line names a key outside the routing key set
    #[error("unknown routing key {key:?} on line {line}")]
    UnknownRoutingKey {
        /// Key name as found
        key: String,
        /// 1-based line number
        line: usize,
    },

    /// Keys are repeated or out of order
    #[error("routing pairs are not in ascending key order at line {line}")]
    UnsortedPairs {
        /// 1-based line number
        line: usize,
    },
}

/// Errors raised while loading or validating codec configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is not valid JSON for [`crate::TokenCodecConfig`]
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Environment override does not parse
    #[error("invalid {name} value {value:?}")]
    InvalidEnv {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },

    /// Random block length outside 1..=255
    #[error("random block length must be between 1 and 255 bytes, got {0}")]
    InvalidRandomBytesLength(usize),

    /// Payload budget whose worst case overflows the length marker
    #[error(
        "payload budget of {max_payload_size} bytes encodes to {encoded_length} characters, \
         which does not fit the length marker (maximum {max})"
    )]
    LengthMarkerBudget {
        /// Configured payload budget
        max_payload_size: usize,
        /// Encoded length of a full-budget payload
        encoded_length: usize,
        /// Largest describable length
        max: u64,
    },
}

struct KeyList<'a>(&'a [RoutingKey]);

impl fmt::Display for KeyList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(|key| format!(":{key}")).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

struct NameList<'a>(&'a [String]);

impl fmt::Display for NameList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(|name| format!(":{name}")).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
