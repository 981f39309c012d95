//! Random block sources
//!
//! The random block is the only non-deterministic part of a token. Sources
//! must be safe to share between threads; the codec holds one behind an
//! `Arc` and calls it concurrently.

use rand::RngCore;
use zeroize::Zeroizing;

/// Reference length of the random block, in bytes
pub const RANDOM_BYTES_LENGTH: usize = 16;

/// Supplier of the per-token random block
pub trait EntropySource: Send + Sync {
    /// Fill `buf` completely with random bytes.
    ///
    /// There is no weaker fallback, so implementations panic rather than
    /// return partially filled buffers.
    fn fill_bytes(&self, buf: &mut [u8]);

    /// Allocate and fill a block of `len` bytes
    fn generate_bytes(&self, len: usize) -> Zeroizing<Vec<u8>> {
        let mut bytes = Zeroizing::new(vec![0u8; len]);
        self.fill_bytes(&mut bytes);
        bytes
    }
}

/// Thread-local CSPRNG seeded from the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill_bytes(&self, buf: &mut [u8]) {
        rand::rng().fill_bytes(buf);
    }
}

/// Repeats a fixed byte pattern
///
/// Makes token generation reproducible in tests and fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedEntropy {
    pattern: Vec<u8>,
}

impl FixedEntropy {
    /// Source that cycles through `pattern`; an empty pattern yields zeros
    #[must_use]
    pub fn new(pattern: impl Into<Vec<u8>>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl EntropySource for FixedEntropy {
    fn fill_bytes(&self, buf: &mut [u8]) {
        if self.pattern.is_empty() {
            buf.fill(0);
            return;
        }

        for (byte, value) in buf.iter_mut().zip(self.pattern.iter().cycle()) {
            *byte = *value;
        }
    }
}
