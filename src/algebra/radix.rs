//! Conversion between digit strings in an arbitrary radix and big integers.
//!
//! Digits are `0-9` followed by `a-z`, case-insensitive, which limits the
//! radix to `2..=36`. Nothing here goes through a machine integer, so a
//! 50-digit binary string decodes just as exactly as a single decimal digit.

use num_bigint::{BigInt, BigUint};
use thiserror::Error;

pub const MIN_RADIX: u32 = 2;
pub const MAX_RADIX: u32 = 36;

/// Why a single share could not be turned into a point.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RadixError {
    #[error("index {0:?} is not a positive integer")]
    InvalidIndex(String),
    #[error("base {0:?} is not an integer")]
    InvalidBase(String),
    #[error("base {0} is outside the supported range 2..=36")]
    UnsupportedBase(u64),
    #[error("value is empty")]
    EmptyValue,
    #[error("value has {len} digits, the limit is {limit}")]
    TooLong { len: usize, limit: usize },
    #[error("digit {digit:?} at position {position} is not valid in base {base}")]
    InvalidDigit {
        digit: char,
        position: usize,
        base: u32,
    },
    #[error("negative value {0} cannot be written as digits")]
    Negative(BigInt),
}

/// Check that `radix` is one we can read and write digits in.
pub fn check_radix(radix: u64) -> Result<u32, RadixError> {
    match u32::try_from(radix) {
        Ok(r) if (MIN_RADIX..=MAX_RADIX).contains(&r) => Ok(r),
        _ => Err(RadixError::UnsupportedBase(radix)),
    }
}

/// Parse the textual form of a radix, e.g. the `"16"` in a share.
pub fn parse_radix(text: &str) -> Result<u32, RadixError> {
    let radix: u64 = text
        .trim()
        .parse()
        .map_err(|_| RadixError::InvalidBase(text.to_owned()))?;
    check_radix(radix)
}

/// Decode a digit string into an unsigned integer.
///
/// Every character must be a digit of `radix`; there is no sign, separator
/// or whitespace handling. Leading zeros are accepted.
///
/// * `value`: the digits, most significant first
/// * `radix`: base in `2..=36`
pub fn decode(value: &str, radix: u32) -> Result<BigUint, RadixError> {
    let radix = check_radix(radix.into())?;
    if value.is_empty() {
        return Err(RadixError::EmptyValue);
    }

    let digits = value
        .chars()
        .enumerate()
        .map(|(position, digit)| {
            digit
                .to_digit(radix)
                .map(|d| d as u8)
                .ok_or(RadixError::InvalidDigit {
                    digit,
                    position,
                    base: radix,
                })
        })
        .collect::<Result<Vec<u8>, _>>()?;

    BigUint::from_radix_be(&digits, radix).ok_or(RadixError::UnsupportedBase(radix.into()))
}

/// Encode an unsigned integer as lowercase digits in `radix`.
///
/// Zero encodes as `"0"`; no leading zeros are produced otherwise.
pub fn encode(value: &BigUint, radix: u32) -> Result<String, RadixError> {
    let radix = check_radix(radix.into())?;
    Ok(value.to_str_radix(radix))
}
