//! Base36 numerals (`0-9a-z`)
//!
//! Token fields that carry numbers (routing ids, the length marker and the
//! checksum) are written in lowercase base36 to keep them short and
//! URL-safe.

use thiserror::Error;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Radix of every numeral produced by this module
pub const RADIX: u32 = 36;

/// Base36 parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base36Error {
    /// No digits at all
    #[error("empty base36 numeral")]
    Empty,

    /// Character outside `0-9a-z`
    #[error("invalid base36 digit {digit:?} at offset {offset}")]
    InvalidDigit {
        /// Offending character
        digit: char,
        /// Byte offset within the numeral
        offset: usize,
    },

    /// Value does not fit the target integer
    #[error("base36 numeral overflows {bits} bits")]
    Overflow {
        /// Width of the target integer
        bits: u32,
    },
}

/// Encode an unsigned value without padding.
#[must_use]
pub fn encode_u64(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut buf = Vec::with_capacity(13);
    while value > 0 {
        buf.push(DIGITS[(value % u64::from(RADIX)) as usize]);
        value /= u64::from(RADIX);
    }
    buf.reverse();
    buf.into_iter().map(char::from).collect()
}

/// Encode a signed value; negatives keep a leading `-`.
#[must_use]
pub fn encode_i64(value: i64) -> String {
    if value < 0 {
        format!("-{}", encode_u64(value.unsigned_abs()))
    } else {
        encode_u64(value.unsigned_abs())
    }
}

/// Encode `value` left-padded with zeros to at least `width` digits.
///
/// Wider values are not truncated; callers that need a fixed width must
/// check the returned length.
#[must_use]
pub fn encode_padded(value: u64, width: usize) -> String {
    format!("{:0>width$}", encode_u64(value))
}

/// Largest value that fits in `width` digits, saturating at `u64::MAX`.
#[must_use]
pub fn max_for_width(width: u32) -> u64 {
    u64::from(RADIX)
        .checked_pow(width)
        .map_or(u64::MAX, |limit| limit - 1)
}

/// Parse a lowercase base36 numeral.
///
/// # Errors
///
/// Returns an error if the input is empty, contains anything other than
/// `0-9a-z`, or does not fit in a `u64`.
pub fn decode_u64(numeral: &str) -> Result<u64, Base36Error> {
    if numeral.is_empty() {
        return Err(Base36Error::Empty);
    }

    numeral
        .char_indices()
        .try_fold(0u64, |acc, (offset, digit)| {
            let value = digit_value(digit).ok_or(Base36Error::InvalidDigit { digit, offset })?;
            acc.checked_mul(u64::from(RADIX))
                .and_then(|acc| acc.checked_add(u64::from(value)))
                .ok_or(Base36Error::Overflow { bits: 64 })
        })
}

/// Parse a signed base36 numeral as written by [`encode_i64`].
///
/// # Errors
///
/// Same conditions as [`decode_u64`], with the magnitude bounded by `i64`.
pub fn decode_i64(numeral: &str) -> Result<i64, Base36Error> {
    match numeral.strip_prefix('-') {
        Some(magnitude) => {
            let magnitude = decode_u64(magnitude)?;
            0i64.checked_sub_unsigned(magnitude)
                .ok_or(Base36Error::Overflow { bits: 64 })
        }
        None => i64::try_from(decode_u64(numeral)?).map_err(|_| Base36Error::Overflow { bits: 63 }),
    }
}

fn digit_value(digit: char) -> Option<u32> {
    match digit {
        '0'..='9' | 'a'..='z' => digit.to_digit(RADIX),
        _ => None,
    }
}
