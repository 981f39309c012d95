//! Common infrastructure for the routable token workspace
//!
//! - Base36 numerals used by every numeric token field
//! - Logging bootstrap and token-safe log helpers

#![forbid(unsafe_code)]

pub mod base36;
pub mod logging;

pub use base36::Base36Error;
pub use logging::LoggingTransformer;
