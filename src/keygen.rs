use num_bigint::BigInt;
use num_traits::One;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

use crate::functions::{
    generate_prime_until, is_probable_prime, lcm, mod_inverse, FunctionError,
};
use crate::priv_key::PrivateKey;
use crate::pub_key::PublicKey;

pub const MIN_KEY_BITS: usize = 64;

/// Fresh prime pairs drawn before giving up on an invertible `lambda`.
const MAX_KEYGEN_ATTEMPTS: usize = 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyGenError {
    #[error("bit size too small: {0} < 64")]
    BitSizeTooSmall(usize),
    #[error("failed to generate primes: {0}")]
    PrimeGeneration(#[from] FunctionError),
    #[error("p and q must be distinct primes")]
    InvalidPrimes,
    #[error("lambda is not invertible mod n")]
    NonInvertibleLambda,
    #[error("key generation timed out")]
    Timeout,
}

/// A Paillier key pair for one election.
#[derive(Debug, Clone)]
pub struct KeyPair {
    public_key: PublicKey,
    private_key: PrivateKey,
}

impl KeyPair {
    /// Derives the key pair from two distinct primes.
    pub fn from_primes(p: &BigInt, q: &BigInt) -> Result<Self, KeyGenError> {
        if p == q || !is_probable_prime(p) || !is_probable_prime(q) {
            return Err(KeyGenError::InvalidPrimes);
        }
        let n = p * q;
        let lambda = lcm(&(p - BigInt::one()), &(q - BigInt::one()));
        let mu = mod_inverse(&lambda, &n).ok_or(KeyGenError::NonInvertibleLambda)?;

        Ok(KeyPair {
            public_key: PublicKey::new(n),
            private_key: PrivateKey::from_parts(lambda, mu),
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn into_parts(self) -> (PublicKey, PrivateKey) {
        (self.public_key, self.private_key)
    }
}

/// Generates a key pair whose modulus is `bit_length` bits wide.
pub fn generate_key_pair(bit_length: usize) -> Result<KeyPair, KeyGenError> {
    generate(bit_length, None)
}

/// As [`generate_key_pair`], failing with [`KeyGenError::Timeout`] once
/// `timeout` has elapsed.
pub fn generate_key_pair_with_timeout(
    bit_length: usize,
    timeout: Duration,
) -> Result<KeyPair, KeyGenError> {
    generate(bit_length, Some(Instant::now() + timeout))
}

fn generate(bit_length: usize, deadline: Option<Instant>) -> Result<KeyPair, KeyGenError> {
    if bit_length < MIN_KEY_BITS {
        return Err(KeyGenError::BitSizeTooSmall(bit_length));
    }
    let p_prime_size = (bit_length + 1) / 2;
    let q_prime_size = bit_length - p_prime_size;

    for attempt in 1..=MAX_KEYGEN_ATTEMPTS {
        let p = prime(p_prime_size, deadline)?;
        let q = loop {
            let q = prime(q_prime_size, deadline)?;
            if q != p {
                break q;
            }
        };

        match KeyPair::from_primes(&p, &q) {
            Ok(key_pair) => {
                debug!(bit_length, attempt, "generated Paillier key pair");
                return Ok(key_pair);
            }
            Err(KeyGenError::NonInvertibleLambda) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(KeyGenError::NonInvertibleLambda)
}

fn prime(bits: usize, deadline: Option<Instant>) -> Result<BigInt, KeyGenError> {
    generate_prime_until(bits, deadline).map_err(|e| match e {
        FunctionError::Timeout => KeyGenError::Timeout,
        other => KeyGenError::PrimeGeneration(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_integer::Integer;
    use num_traits::Zero;

    #[test]
    fn test_keygen() {
        let kp = generate_key_pair(512).unwrap();
        let pk = kp.public_key();
        assert_eq!(pk.bits(), 512);
        assert_eq!(pk.g(), &(pk.n() + 1));

        let sk = kp.private_key();
        assert_eq!((sk.lambda() * sk.mu()).mod_floor(pk.n()), BigInt::one());
    }

    #[test]
    fn test_keygen_odd_bit_length() {
        let kp = generate_key_pair(129).unwrap();
        assert_eq!(kp.public_key().bits(), 129);
    }

    #[test]
    fn test_keygen_rejects_small_bit_size() {
        assert_eq!(
            generate_key_pair(32).unwrap_err(),
            KeyGenError::BitSizeTooSmall(32)
        );
    }

    #[test]
    fn test_keygen_produces_distinct_keys() {
        let a = generate_key_pair(128).unwrap();
        let b = generate_key_pair(128).unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_keygen_timeout() {
        assert_eq!(
            generate_key_pair_with_timeout(512, Duration::ZERO).unwrap_err(),
            KeyGenError::Timeout
        );
        assert!(generate_key_pair_with_timeout(256, Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn test_from_primes() {
        let p = BigInt::from(1_000_003u64);
        let q = BigInt::from(1_000_033u64);
        let kp = KeyPair::from_primes(&p, &q).unwrap();
        assert_eq!(kp.public_key().n(), &(&p * &q));
        assert_eq!(
            kp.private_key().lambda(),
            &lcm(&BigInt::from(1_000_002u64), &BigInt::from(1_000_032u64))
        );
    }

    #[test]
    fn test_from_primes_rejects_invalid_input() {
        let p = BigInt::from(1_000_003u64);
        assert_eq!(
            KeyPair::from_primes(&p, &p).unwrap_err(),
            KeyGenError::InvalidPrimes
        );
        assert_eq!(
            KeyPair::from_primes(&p, &BigInt::from(1_000_004u64)).unwrap_err(),
            KeyGenError::InvalidPrimes
        );
    }

    #[test]
    fn test_into_parts() {
        let kp = KeyPair::from_primes(&BigInt::from(1_000_003u64), &BigInt::from(1_000_033u64))
            .unwrap();
        let n = kp.public_key().n().clone();
        let (pk, sk) = kp.into_parts();
        assert_eq!(pk.n(), &n);
        assert!(!sk.lambda().is_zero());
    }
}
