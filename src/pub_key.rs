use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::ciphertext::Ciphertext;
use crate::functions::{gcd, mod_pow, random_coprime};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PubKeyError {
    #[error("plaintext out of range [0, n)")]
    InvalidPlaintext,
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),
    #[error("empty aggregate used as a ciphertext")]
    EmptyAggregate,
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("random number generation failed: {0}")]
    RandomNumberError(String),
    #[error("private exponent must be positive")]
    InvalidPrivateKey,
    #[error("share {0} has a negative exponent")]
    NegativeShare(u32),
}

/// Paillier public key `(n, g)` with `g = n + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicKey {
    #[serde(with = "crate::encoding::big_int")]
    n: BigInt,
    #[serde(with = "crate::encoding::big_int")]
    g: BigInt,
    #[serde(skip)]
    n_squared: BigInt,
}

#[derive(Deserialize)]
struct RawPublicKey {
    #[serde(with = "crate::encoding::big_int")]
    n: BigInt,
    #[serde(with = "crate::encoding::big_int")]
    g: BigInt,
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawPublicKey::deserialize(deserializer)?;
        PublicKey::from_parts(raw.n, raw.g).map_err(serde::de::Error::custom)
    }
}

impl PublicKey {
    /// Builds the key for modulus `n`. Callers must ensure `n > 1`.
    pub(crate) fn new(n: BigInt) -> Self {
        let g = &n + BigInt::one();
        let n_squared = &n * &n;
        PublicKey { n, g, n_squared }
    }

    /// Restores a published `(n, g)` pair.
    pub fn from_parts(n: BigInt, g: BigInt) -> Result<Self, PubKeyError> {
        if n <= BigInt::one() {
            return Err(PubKeyError::InvalidPublicKey("n must exceed 1".to_string()));
        }
        if g != &n + BigInt::one() {
            return Err(PubKeyError::InvalidPublicKey("g must equal n + 1".to_string()));
        }
        Ok(PublicKey::new(n))
    }

    pub fn n(&self) -> &BigInt {
        &self.n
    }

    pub fn g(&self) -> &BigInt {
        &self.g
    }

    pub fn n_squared(&self) -> &BigInt {
        &self.n_squared
    }

    pub fn bits(&self) -> u64 {
        self.n.bits()
    }

    /// Encrypts `message` with fresh randomness `r ∈ [1, n-1]`, `gcd(r, n) = 1`.
    pub fn encrypt(&self, message: &BigInt) -> Result<Ciphertext, PubKeyError> {
        let r = self.random_unit()?;
        self.encrypt_with_randomness(message, &r)
    }

    /// `c = g^m · r^n mod n²` for a caller-chosen `r`.
    pub fn encrypt_with_randomness(
        &self,
        message: &BigInt,
        r: &BigInt,
    ) -> Result<Ciphertext, PubKeyError> {
        if message.is_negative() || message >= &self.n {
            return Err(PubKeyError::InvalidPlaintext);
        }
        if r <= &BigInt::zero() || r >= &self.n || !gcd(r, &self.n).is_one() {
            return Err(PubKeyError::RandomNumberError(
                "randomness must be a unit in [1, n)".to_string(),
            ));
        }
        let g_m = self.g.modpow(message, &self.n_squared);
        let r_n = r.modpow(&self.n, &self.n_squared);
        Ok(Ciphertext::new((g_m * r_n) % &self.n_squared))
    }

    /// Homomorphic addition: the result decrypts to `m1 + m2 mod n`.
    pub fn add(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext, PubKeyError> {
        self.check_bounds(c1)?;
        self.check_bounds(c2)?;
        Ok(Ciphertext::new(
            (c1.value() * c2.value()) % &self.n_squared,
        ))
    }

    /// Homomorphic scalar multiplication: the result decrypts to `m · k mod n`.
    ///
    /// A negative `k` inverts `c` mod `n²` first.
    pub fn multiply(&self, c: &Ciphertext, k: &BigInt) -> Result<Ciphertext, PubKeyError> {
        self.check_bounds(c)?;
        let product = mod_pow(c.value(), k, &self.n_squared).ok_or_else(|| {
            PubKeyError::MalformedCiphertext("ciphertext is not invertible mod n^2".to_string())
        })?;
        Ok(Ciphertext::new(product))
    }

    /// Multiplies in a fresh encryption of zero. The plaintext is unchanged.
    pub fn rerandomize(&self, c: &Ciphertext) -> Result<Ciphertext, PubKeyError> {
        let zero = self.encrypt(&BigInt::zero())?;
        self.add(c, &zero)
    }

    /// Shape check: `0 < c < n²` and `gcd(c, n) = 1`.
    ///
    /// This does not show that the plaintext is a valid vote value.
    pub fn verify_ciphertext(&self, c: &Ciphertext) -> bool {
        let value = c.value();
        value > &BigInt::zero() && value < &self.n_squared && gcd(value, &self.n).is_one()
    }

    /// Like [`verify_ciphertext`](Self::verify_ciphertext), reporting why a value is rejected.
    pub fn validate_ciphertext(&self, c: &Ciphertext) -> Result<(), PubKeyError> {
        self.check_bounds(c)?;
        if !gcd(c.value(), &self.n).is_one() {
            return Err(PubKeyError::MalformedCiphertext(
                "ciphertext shares a factor with n".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn check_bounds(&self, c: &Ciphertext) -> Result<(), PubKeyError> {
        if c.is_empty_aggregate() {
            return Err(PubKeyError::EmptyAggregate);
        }
        if c.value() < &BigInt::zero() || c.value() >= &self.n_squared {
            return Err(PubKeyError::MalformedCiphertext(
                "ciphertext out of bounds".to_string(),
            ));
        }
        Ok(())
    }

    /// `L(x) = (x - 1) / n`, exact for `x ≡ 1 mod n`.
    pub(crate) fn l_function(&self, x: &BigInt) -> BigInt {
        (x - BigInt::one()) / &self.n
    }

    pub fn random_unit(&self) -> Result<BigInt, PubKeyError> {
        random_coprime(&self.n, &mut OsRng)
            .map_err(|e| PubKeyError::RandomNumberError(e.to_string()))
    }
}
