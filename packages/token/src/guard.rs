//! Plaintext payload serialization and size budget

use crate::error::{Result, TokenError};
use crate::resolver::ResolvedRoutingPairs;
use tracing::warn;

/// Reference budget for the serialized routing payload, in bytes
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 159;

/// Separator between a key and its value
pub const PAIR_SEPARATOR: char = ':';

/// Separator between pairs
pub const LINE_SEPARATOR: char = '\n';

/// Canonical `key:value` lines, newline-joined without a trailing newline.
#[must_use]
pub fn serialize(pairs: &ResolvedRoutingPairs) -> String {
    pairs
        .pairs()
        .iter()
        .map(|(key, value)| format!("{key}{PAIR_SEPARATOR}{value}"))
        .collect::<Vec<_>>()
        .join(&LINE_SEPARATOR.to_string())
}

/// Rejects payloads over the byte budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadSizeGuard {
    max: usize,
}

impl PayloadSizeGuard {
    /// Guard with a custom budget
    #[must_use]
    pub const fn new(max: usize) -> Self {
        Self { max }
    }

    /// Configured budget in bytes
    #[must_use]
    pub const fn max(&self) -> usize {
        self.max
    }

    /// Serialize `pairs` and enforce the budget
    ///
    /// # Errors
    ///
    /// - [`TokenError::LineSeparatorInValue`] when a value would split into
    ///   extra lines
    /// - [`TokenError::PayloadTooLarge`] when the serialization is longer
    ///   than the budget
    pub fn serialize(&self, pairs: &ResolvedRoutingPairs) -> Result<String> {
        reject_line_separators(pairs)?;
        self.check(serialize(pairs))
    }

    /// Enforce the budget on an already serialized payload
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::PayloadTooLarge`] when `payload` is longer than
    /// the budget.
    pub fn check(&self, payload: String) -> Result<String> {
        if payload.len() > self.max {
            warn!(size = payload.len(), max = self.max, "Routing payload over budget");
            return Err(TokenError::PayloadTooLarge {
                size: payload.len(),
                max: self.max,
            });
        }

        Ok(payload)
    }
}

/// A value holding the line separator would be read back as further pairs.
fn reject_line_separators(pairs: &ResolvedRoutingPairs) -> Result<()> {
    match pairs
        .pairs()
        .iter()
        .find(|(_, value)| value.contains(LINE_SEPARATOR))
    {
        Some((key, _)) => {
            warn!(key = %key, "Routing value contains a line separator");
            Err(TokenError::LineSeparatorInValue { key: *key })
        }
        None => Ok(()),
    }
}

impl Default for PayloadSizeGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD_SIZE)
    }
}
