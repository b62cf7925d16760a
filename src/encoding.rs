//! Text encodings for the big integers exchanged with storage and transport.
//!
//! Integers are written as decimal strings by default. Byte-oriented sinks use
//! [`to_hex`], which emits the minimal big-endian byte string, so the hex text
//! always has an even number of digits. Parsing accepts decimal, or hex when
//! prefixed with `0x`.

use num_bigint::{BigInt, Sign};
use num_traits::Num;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("empty integer encoding")]
    Empty,
    #[error("invalid hex integer: {0}")]
    InvalidHex(String),
    #[error("invalid decimal integer: {0}")]
    InvalidDecimal(String),
}

/// Minimal big-endian hex of a non-negative integer, without a `0x` prefix.
pub fn to_hex(value: &BigInt) -> String {
    hex::encode(to_bytes_be(value))
}

/// Minimal big-endian bytes of the magnitude; zero encodes as a single zero byte.
pub fn to_bytes_be(value: &BigInt) -> Vec<u8> {
    let (_, bytes) = value.to_bytes_be();
    bytes
}

pub fn from_bytes_be(bytes: &[u8]) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, bytes)
}

/// Parses hex with or without a `0x` prefix. Odd-length input is left-padded.
pub fn from_hex(text: &str) -> Result<BigInt, EncodingError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(EncodingError::Empty);
    }
    let padded = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let bytes = hex::decode(&padded).map_err(|e| EncodingError::InvalidHex(e.to_string()))?;
    Ok(from_bytes_be(&bytes))
}

pub fn to_decimal(value: &BigInt) -> String {
    value.to_str_radix(10)
}

pub fn from_decimal(text: &str) -> Result<BigInt, EncodingError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EncodingError::Empty);
    }
    BigInt::from_str_radix(trimmed, 10).map_err(|_| EncodingError::InvalidDecimal(trimmed.into()))
}

/// Decimal unless the text carries a `0x` prefix.
pub fn parse_big_int(text: &str) -> Result<BigInt, EncodingError> {
    let trimmed = text.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        from_hex(trimmed)
    } else {
        from_decimal(trimmed)
    }
}

/// Left-pads `bytes` with zeros up to `len`. Longer input is returned as is.
pub fn pad_be(bytes: &[u8], len: usize) -> Vec<u8> {
    if bytes.len() >= len {
        return bytes.to_vec();
    }
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(bytes);
    out
}

/// Serde adapter: decimal string out, decimal or `0x` hex in.
///
/// Use as `#[serde(with = "crate::encoding::big_int")]`.
pub mod big_int {
    use super::{parse_big_int, to_decimal};
    use num_bigint::BigInt;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_decimal(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_big_int(&text).map_err(de::Error::custom)
    }
}
