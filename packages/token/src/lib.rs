//! Routable tokens
//!
//! Opaque credential strings that carry routing metadata (cell,
//! organization, group, project, user) so an edge proxy can pick a backend
//! partition before any lookup or authentication happens:
//!
//! ```text
//! token := prefix base64url(payload || random || len(random)) "." length crc32
//! ```
//!
//! The CRC32 suffix detects corruption; it is not a MAC.
//!
//! ```rust
//! use routable_token::{RoutableToken, RoutingKey, RoutingPayload};
//!
//! struct Owner {
//!     organization_id: i64,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = RoutableToken::builder().with_cell_id(1).build()?;
//! let payload = RoutingPayload::new()
//!     .with_derived(RoutingKey::Organization, |owner: &Owner| owner.organization_id);
//!
//! let token = codec.generate_token(&Owner { organization_id: 42 }, &payload, "rt-")?;
//! let decoded = routable_token::decode_with_prefix(token.as_str(), "rt-")?;
//! assert_eq!(decoded.payload(), "c:1\no:16");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod codec;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod entropy;
pub mod error;
pub mod guard;
pub mod integrity;
pub mod key;
pub mod resolver;
pub mod validator;
pub mod value;

pub use codec::{EncodedToken, RoutableToken, RoutableTokenBuilder, RoutableTokenCodec};
pub use config::TokenCodecConfig;
pub use decoder::{decode, decode_with_prefix, DecodedToken};
pub use entropy::{EntropySource, FixedEntropy, OsEntropy, RANDOM_BYTES_LENGTH};
pub use error::{ConfigError, DecodeError, Result, TokenError};
pub use guard::{PayloadSizeGuard, DEFAULT_MAX_PAYLOAD_SIZE};
pub use key::RoutingKey;
pub use resolver::{ResolvedRoutingPairs, RoutingPayloadResolver};
pub use value::{RoutingPayload, RoutingValue, RoutingValueSource};
