use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::encoding::{self, EncodingError};

/// A Paillier ciphertext, an integer in `[1, n²)` coprime to `n`.
///
/// The value zero is reserved for the result of aggregating no ballots. It is
/// not a valid ciphertext, and every operation that needs a real ciphertext
/// refuses it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ciphertext(#[serde(with = "crate::encoding::big_int")] BigInt);

impl Ciphertext {
    pub fn new(value: BigInt) -> Self {
        Ciphertext(value)
    }

    pub(crate) fn empty_aggregate() -> Self {
        Ciphertext(BigInt::zero())
    }

    /// True for the placeholder returned by aggregating an empty ballot list.
    pub fn is_empty_aggregate(&self) -> bool {
        self.0.is_zero()
    }

    pub fn value(&self) -> &BigInt {
        &self.0
    }

    pub fn into_inner(self) -> BigInt {
        self.0
    }

    /// Minimal big-endian hex, even length, no prefix.
    pub fn to_hex(&self) -> String {
        encoding::to_hex(&self.0)
    }

    pub fn from_hex(text: &str) -> Result<Self, EncodingError> {
        encoding::from_hex(text).map(Ciphertext)
    }

    pub fn to_bytes_be(&self) -> Vec<u8> {
        encoding::to_bytes_be(&self.0)
    }

    /// Big-endian bytes left-padded to `len`, for fixed-width slots.
    pub fn to_bytes_be_padded(&self, len: usize) -> Vec<u8> {
        encoding::pad_be(&self.to_bytes_be(), len)
    }

    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Ciphertext(encoding::from_bytes_be(bytes))
    }

    /// Hex SHA-256 of the minimal big-endian encoding; usable as a ballot receipt.
    pub fn fingerprint(&self) -> String {
        let mut hash = Sha256::new();
        hash.update(self.to_bytes_be());
        hex::encode(hash.finalize())
    }
}

impl From<BigInt> for Ciphertext {
    fn from(value: BigInt) -> Self {
        Ciphertext(value)
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty_aggregate() {
            return f.write_str("Ciphertext(<empty aggregate>)");
        }
        write!(f, "Ciphertext(0x{})", self.to_hex())
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
