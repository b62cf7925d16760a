use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use std::fmt;
use zeroize::Zeroize;

use crate::ciphertext::Ciphertext;
use crate::pub_key::{PubKeyError, PublicKey};

/// Paillier private key: `lambda = lcm(p-1, q-1)` and `mu = lambda⁻¹ mod n`.
///
/// Cleared on drop. Once the key has been split among trustees the issuer
/// should let it go out of scope.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    lambda: BigInt,
    mu: BigInt,
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        self.lambda = BigInt::zero();
        self.mu = BigInt::zero();
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey { .. }")
    }
}

impl PrivateKey {
    pub fn from_parts(lambda: BigInt, mu: BigInt) -> Self {
        PrivateKey { lambda, mu }
    }

    pub fn lambda(&self) -> &BigInt {
        &self.lambda
    }

    pub fn mu(&self) -> &BigInt {
        &self.mu
    }

    /// `m = L(c^lambda mod n²) · mu mod n`.
    ///
    /// A ciphertext produced under a different key decrypts to an unrelated
    /// value rather than an error; run
    /// [`PublicKey::validate_ciphertext`] first when that matters.
    pub fn decrypt(&self, c: &Ciphertext, pub_key: &PublicKey) -> Result<BigInt, PubKeyError> {
        if c.is_empty_aggregate() {
            return Err(PubKeyError::EmptyAggregate);
        }
        if !self.lambda.is_positive() {
            return Err(PubKeyError::InvalidPrivateKey);
        }
        let x = c.value().modpow(&self.lambda, pub_key.n_squared());
        Ok(self.unscale(&pub_key.l_function(&x), pub_key))
    }

    /// Final step shared with threshold combination: `L · mu mod n`.
    pub(crate) fn unscale(&self, l: &BigInt, pub_key: &PublicKey) -> BigInt {
        (l * &self.mu) % pub_key.n()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::KeyPair;

    #[test]
    fn test_decrypt_rejects_empty_aggregate() {
        let kp =
            KeyPair::from_primes(&BigInt::from(1_000_003u64), &BigInt::from(1_000_033u64)).unwrap();
        assert_eq!(
            kp.private_key()
                .decrypt(&Ciphertext::new(BigInt::zero()), kp.public_key()),
            Err(PubKeyError::EmptyAggregate)
        );
    }

    #[test]
    fn test_decrypt_foreign_ciphertext_is_not_an_error() {
        let kp =
            KeyPair::from_primes(&BigInt::from(1_000_003u64), &BigInt::from(1_000_033u64)).unwrap();
        let other =
            KeyPair::from_primes(&BigInt::from(1_000_037u64), &BigInt::from(1_000_039u64)).unwrap();
        let c = other.public_key().encrypt(&BigInt::from(1u32)).unwrap();
        assert!(kp.private_key().decrypt(&c, kp.public_key()).is_ok());
    }

    #[test]
    fn test_decrypt_rejects_non_positive_lambda() {
        let kp =
            KeyPair::from_primes(&BigInt::from(1_000_003u64), &BigInt::from(1_000_033u64)).unwrap();
        let c = kp.public_key().encrypt(&BigInt::from(9u32)).unwrap();
        for lambda in [BigInt::from(-5), BigInt::zero()] {
            let key = PrivateKey::from_parts(lambda, kp.private_key().mu().clone());
            assert_eq!(
                key.decrypt(&c, kp.public_key()),
                Err(PubKeyError::InvalidPrivateKey)
            );
        }
    }

    #[test]
    fn test_private_key_zeroize() {
        let mut key = PrivateKey::from_parts(BigInt::from(123456), BigInt::from(654321));
        assert_eq!(key.lambda(), &BigInt::from(123456));
        key.zeroize();
        assert_eq!(key.lambda(), &BigInt::zero());
        assert_eq!(key.mu(), &BigInt::zero());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let key = PrivateKey::from_parts(BigInt::from(123456), BigInt::from(654321));
        let debug_output = format!("{:?}", key);
        assert!(!debug_output.contains("123456"));
        assert!(debug_output.contains("PrivateKey"));
    }
}
