//! Codec configuration
//!
//! JSON file or defaults, then the `ROUTABLE_TOKEN_CELL_ID` override, then
//! [`TokenCodecConfig::validate`] before a codec is built.

use crate::encoder::{encoded_length, max_encoded_length};
use crate::entropy::RANDOM_BYTES_LENGTH;
use crate::error::ConfigError;
use crate::guard::DEFAULT_MAX_PAYLOAD_SIZE;
use crate::key::RoutingKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Environment variable overriding [`TokenCodecConfig::cell_id`]
pub const CELL_ID_ENV: &str = "ROUTABLE_TOKEN_CELL_ID";

/// Codec settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenCodecConfig {
    /// Cell of the current deployment; emitted as the default `c` pair
    #[serde(default)]
    pub cell_id: Option<i64>,
    /// Byte budget of the serialized routing payload
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,
    /// Random bytes per token (1..=255)
    #[serde(default = "default_random_bytes_length")]
    pub random_bytes_length: usize,
    /// Keys every caller payload must supply
    #[serde(default = "default_required_keys")]
    pub required_keys: BTreeSet<RoutingKey>,
}

fn default_max_payload_size() -> usize {
    DEFAULT_MAX_PAYLOAD_SIZE
}

fn default_random_bytes_length() -> usize {
    RANDOM_BYTES_LENGTH
}

fn default_required_keys() -> BTreeSet<RoutingKey> {
    BTreeSet::from([RoutingKey::Organization])
}

impl Default for TokenCodecConfig {
    fn default() -> Self {
        Self {
            cell_id: None,
            max_payload_size: default_max_payload_size(),
            random_bytes_length: default_random_bytes_length(),
            required_keys: default_required_keys(),
        }
    }
}

impl TokenCodecConfig {
    /// Parse a JSON document; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON or unknown keys.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// errors of [`TokenCodecConfig::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading token codec configuration");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Apply environment overrides
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if an override is not a number.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if an override is not a number.
    pub fn apply_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(CELL_ID_ENV) {
            let cell_id = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: CELL_ID_ENV,
                value: value.clone(),
            })?;
            self.cell_id = Some(cell_id);
        }
        Ok(self)
    }

    /// Check the settings against the token format limits
    ///
    /// The worst-case payload plus its random block and length byte must
    /// still encode to a length the two-digit marker can hold.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidRandomBytesLength`] outside 1..=255
    /// - [`ConfigError::LengthMarkerBudget`] if the budget can overflow the marker
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=usize::from(u8::MAX)).contains(&self.random_bytes_length) {
            return Err(ConfigError::InvalidRandomBytesLength(
                self.random_bytes_length,
            ));
        }

        let raw_len = self
            .max_payload_size
            .saturating_add(self.random_bytes_length)
            .saturating_add(1);
        let encoded = encoded_length(raw_len.min(usize::MAX / 2));
        let max = max_encoded_length();
        if u64::try_from(encoded).map_or(true, |encoded| encoded > max) {
            return Err(ConfigError::LengthMarkerBudget {
                max_payload_size: self.max_payload_size,
                encoded_length: encoded,
                max,
            });
        }

        Ok(())
    }
}
