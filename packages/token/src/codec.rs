//! Routable token codec - entry point and builder
//!
//! Pipeline per call: validate keys, resolve the payload, enforce the size
//! budget, encode with a fresh random block, append the checksum.

use crate::config::TokenCodecConfig;
use crate::encoder::TokenEncoder;
use crate::entropy::{EntropySource, OsEntropy};
use crate::error::{ConfigError, Result};
use crate::guard::PayloadSizeGuard;
use crate::integrity;
use crate::key::RoutingKey;
use crate::resolver::{ResolvedRoutingPairs, RoutingPayloadResolver};
use crate::validator::validate_routing_keys;
use crate::value::{RoutingPayload, RoutingValueSource};
use routable_common::LoggingTransformer;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Minted token string
///
/// ASCII only, single line, safe in headers and URLs without escaping.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedToken(String);

impl EncodedToken {
    /// Token text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the token text
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

// Tokens are credentials; keep them out of debug output.
impl fmt::Debug for EncodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EncodedToken({})",
            LoggingTransformer::fingerprint(&self.0)
        )
    }
}

impl fmt::Display for EncodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncodedToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<EncodedToken> for String {
    fn from(token: EncodedToken) -> Self {
        token.0
    }
}

/// Entry point for building a codec
pub struct RoutableToken;

impl RoutableToken {
    /// Builder with default settings
    #[must_use]
    pub fn builder<O: ?Sized>() -> RoutableTokenBuilder<O> {
        RoutableTokenBuilder::new()
    }
}

/// Codec builder
pub struct RoutableTokenBuilder<O: ?Sized> {
    config: TokenCodecConfig,
    extra_defaults: Vec<(RoutingKey, RoutingValueSource<O>)>,
    entropy: Arc<dyn EntropySource>,
}

impl<O: ?Sized> RoutableTokenBuilder<O> {
    /// Builder with default settings and OS entropy
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: TokenCodecConfig::default(),
            extra_defaults: Vec::new(),
            entropy: Arc::new(OsEntropy),
        }
    }

    /// Replace all settings
    #[must_use]
    pub fn with_config(mut self, config: TokenCodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Cell of the current deployment
    #[must_use]
    pub fn with_cell_id(mut self, cell_id: i64) -> Self {
        self.config.cell_id = Some(cell_id);
        self
    }

    /// Byte budget of the serialized routing payload
    #[must_use]
    pub fn with_max_payload_size(mut self, max_payload_size: usize) -> Self {
        self.config.max_payload_size = max_payload_size;
        self
    }

    /// Random bytes per token
    #[must_use]
    pub fn with_random_bytes_length(mut self, random_bytes_length: usize) -> Self {
        self.config.random_bytes_length = random_bytes_length;
        self
    }

    /// Keys every caller payload must supply
    #[must_use]
    pub fn with_required_keys(mut self, keys: impl IntoIterator<Item = RoutingKey>) -> Self {
        self.config.required_keys = keys.into_iter().collect();
        self
    }

    /// Extra default source, applied before caller entries
    ///
    /// A default for [`RoutingKey::Cell`] replaces the configured cell id.
    #[must_use]
    pub fn with_default(mut self, key: RoutingKey, source: RoutingValueSource<O>) -> Self {
        self.extra_defaults.push((key, source));
        self
    }

    /// Random block source
    #[must_use]
    pub fn with_entropy(mut self, entropy: impl EntropySource + 'static) -> Self {
        self.entropy = Arc::new(entropy);
        self
    }

    /// Validate settings and build the codec
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the settings violate the token format
    /// limits (see [`TokenCodecConfig::validate`]).
    pub fn build(self) -> std::result::Result<RoutableTokenCodec<O>, ConfigError> {
        self.config.validate()?;

        let mut defaults = RoutingPayloadResolver::<O>::for_cell(self.config.cell_id)
            .defaults()
            .clone();
        defaults.extend(self.extra_defaults);
        let resolver = RoutingPayloadResolver::new(defaults);

        let random_bytes_length = u8::try_from(self.config.random_bytes_length)
            .map_err(|_| ConfigError::InvalidRandomBytesLength(self.config.random_bytes_length))?;

        debug!(
            cell_id = ?self.config.cell_id,
            max_payload_size = self.config.max_payload_size,
            random_bytes_length,
            "Routable token codec configured"
        );

        Ok(RoutableTokenCodec {
            resolver,
            required_keys: self.config.required_keys,
            guard: PayloadSizeGuard::new(self.config.max_payload_size),
            random_bytes_length,
            entropy: self.entropy,
        })
    }
}

impl<O: ?Sized> Default for RoutableTokenBuilder<O> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mints routable tokens
///
/// Stateless between calls and safe to share across threads.
pub struct RoutableTokenCodec<O: ?Sized> {
    resolver: RoutingPayloadResolver<O>,
    required_keys: BTreeSet<RoutingKey>,
    guard: PayloadSizeGuard,
    random_bytes_length: u8,
    entropy: Arc<dyn EntropySource>,
}

impl<O: ?Sized> RoutableTokenCodec<O> {
    /// Keys every caller payload must supply
    #[must_use]
    pub fn required_keys(&self) -> &BTreeSet<RoutingKey> {
        &self.required_keys
    }

    /// Byte budget of the serialized routing payload
    #[must_use]
    pub fn max_payload_size(&self) -> usize {
        self.guard.max()
    }

    /// Validate and resolve `payload` for `owner` without encoding
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredRoutingKeys` or `InvalidRoutingKeys`.
    pub fn resolve(&self, owner: &O, payload: &RoutingPayload<O>) -> Result<ResolvedRoutingPairs> {
        validate_routing_keys(payload.names(), &self.required_keys)?;
        Ok(self.resolver.resolve(owner, payload))
    }

    /// Plaintext routing payload that would be embedded for `owner`
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`Self::resolve`], `LineSeparatorInValue`
    /// or `PayloadTooLarge`.
    pub fn routing_payload(&self, owner: &O, payload: &RoutingPayload<O>) -> Result<String> {
        let pairs = self.resolve(owner, payload)?;
        self.guard.serialize(&pairs)
    }

    /// Mint a token for `owner`
    ///
    /// # Errors
    ///
    /// - `MissingRequiredRoutingKeys` when a required key is absent
    /// - `InvalidRoutingKeys` when the payload names an unknown key
    /// - `LineSeparatorInValue` when a resolved value contains a newline
    /// - `PayloadTooLarge` when the serialized routing payload exceeds the budget
    ///
    /// `LengthMarkerOverflow` is also possible in principle but cannot occur
    /// with a configuration that passed [`TokenCodecConfig::validate`].
    pub fn generate_token(
        &self,
        owner: &O,
        payload: &RoutingPayload<O>,
        prefix: &str,
    ) -> Result<EncodedToken> {
        let plaintext = self.routing_payload(owner, payload)?;
        let body = TokenEncoder::new(self.entropy.as_ref(), self.random_bytes_length)
            .encode(prefix, &plaintext)?;
        let token = integrity::append_checksum(body);

        debug!(
            prefix,
            payload_size = plaintext.len(),
            fingerprint = %LoggingTransformer::fingerprint(&token),
            "Routable token minted"
        );

        Ok(EncodedToken(token))
    }
}

impl<O: ?Sized> Clone for RoutableTokenCodec<O> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            required_keys: self.required_keys.clone(),
            guard: self.guard,
            random_bytes_length: self.random_bytes_length,
            entropy: Arc::clone(&self.entropy),
        }
    }
}

impl<O: ?Sized> fmt::Debug for RoutableTokenCodec<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutableTokenCodec")
            .field("resolver", &self.resolver)
            .field("required_keys", &self.required_keys)
            .field("guard", &self.guard)
            .field("random_bytes_length", &self.random_bytes_length)
            .finish_non_exhaustive()
    }
}
