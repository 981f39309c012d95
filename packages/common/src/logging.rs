//! Structured logging bootstrap
//!
//! Provides env_logger-based logging for binaries and tests, plus helpers
//! that log token activity without ever writing token material.

use log::{info, warn};
use sha2::{Digest, Sha256};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Logging entry points shared by the codec and the CLI
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging (call once at application startup)
    ///
    /// Levels come from `RUST_LOG`:
    /// - `RUST_LOG=info` - startup and failures
    /// - `RUST_LOG=debug` - every minted and decoded token
    /// - `RUST_LOG=routable_token=debug` - codec only
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::from_default_env()
                .format_timestamp_micros()
                .init();

            info!("Structured logging initialized");
        });
    }

    /// Initialize logging for test environments
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Log a token that failed to decode
    ///
    /// Only the fingerprint and the failure reason are written.
    pub fn log_token_rejected(token: &str, reason: &dyn std::error::Error) {
        let fingerprint = Self::fingerprint(token);
        warn!("Token rejected: {reason} (fingerprint: {fingerprint})");
    }

    /// Short SHA-256 fingerprint of a token, safe to log
    ///
    /// Returns `#` followed by the first 12 hex characters of the digest.
    #[must_use]
    pub fn fingerprint(token: &str) -> String {
        let hash = Sha256::digest(token.as_bytes());
        let hex_hash = format!("{hash:x}");
        format!("#{}", &hex_hash[..12])
    }
}
