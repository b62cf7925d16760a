//! Shamir secret sharing over a prime field.
//!
//! A secret `s < prime` becomes the constant term of a random polynomial of
//! degree `threshold - 1`; trustee `i` receives `f(i)` for `i = 1..=total`.
//! Any `threshold` shares recover `s` by Lagrange interpolation at zero, and
//! fewer reveal nothing about it.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroize;

use crate::functions::{generate_prime, is_probable_prime, mod_inverse, FunctionError};
use crate::polynomial::{Polynomial, PolynomialError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShamirError {
    #[error("secret must be less than the sharing prime")]
    SecretTooLarge,
    #[error("secret must be non-negative")]
    NegativeSecret,
    #[error("insufficient shares: got {0}, need {1}")]
    InsufficientShares(usize, usize),
    #[error("invalid sharing parameters: {0}")]
    InvalidParameters(String),
    #[error("repeated share id: {0}")]
    DuplicateShareId(u32),
    #[error("share id 0 is not allowed")]
    ZeroShareId,
    #[error("interpolation denominator is not invertible")]
    NoInverse,
    #[error("polynomial error: {0}")]
    Polynomial(#[from] PolynomialError),
    #[error("prime generation failed: {0}")]
    PrimeGeneration(#[from] FunctionError),
}

/// One trustee's point `(id, f(id))` on the sharing polynomial.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub id: u32,
    #[serde(with = "crate::encoding::big_int")]
    pub value: BigInt,
}

impl Share {
    pub fn new(id: u32, value: BigInt) -> Self {
        Share { id, value }
    }
}

impl Zeroize for Share {
    fn zeroize(&mut self) {
        self.value = BigInt::zero();
    }
}

impl Drop for Share {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Parameters of one sharing instance. The prime stays fixed for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawShamirParameters")]
pub struct ShamirParameters {
    total_shares: usize,
    threshold: usize,
    #[serde(with = "crate::encoding::big_int")]
    prime: BigInt,
}

#[derive(Deserialize)]
struct RawShamirParameters {
    total_shares: usize,
    threshold: usize,
    #[serde(with = "crate::encoding::big_int")]
    prime: BigInt,
}

impl TryFrom<RawShamirParameters> for ShamirParameters {
    type Error = ShamirError;

    fn try_from(raw: RawShamirParameters) -> Result<Self, Self::Error> {
        ShamirParameters::new(raw.total_shares, raw.threshold, raw.prime)
    }
}

impl ShamirParameters {
    pub fn new(total_shares: usize, threshold: usize, prime: BigInt) -> Result<Self, ShamirError> {
        if threshold < 1 {
            return Err(ShamirError::InvalidParameters(
                "threshold must be at least 1".to_string(),
            ));
        }
        if threshold > total_shares {
            return Err(ShamirError::InvalidParameters(format!(
                "threshold {} exceeds total shares {}",
                threshold, total_shares
            )));
        }
        if total_shares > u32::MAX as usize {
            return Err(ShamirError::InvalidParameters(
                "too many shares".to_string(),
            ));
        }
        if prime <= BigInt::from(total_shares) || !is_probable_prime(&prime) {
            return Err(ShamirError::InvalidParameters(
                "modulus must be a prime larger than the number of shares".to_string(),
            ));
        }
        Ok(ShamirParameters {
            total_shares,
            threshold,
            prime,
        })
    }

    /// Parameters over a freshly generated prime of `prime_bits` bits.
    pub fn generate(
        total_shares: usize,
        threshold: usize,
        prime_bits: usize,
    ) -> Result<Self, ShamirError> {
        let prime = generate_prime(prime_bits)?;
        Self::new(total_shares, threshold, prime)
    }

    pub fn total_shares(&self) -> usize {
        self.total_shares
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn prime(&self) -> &BigInt {
        &self.prime
    }
}

/// Splits `secret` into `params.total_shares()` shares with ids `1..=total`.
pub fn generate_shares(
    secret: &BigInt,
    params: &ShamirParameters,
) -> Result<Vec<Share>, ShamirError> {
    if secret.is_negative() {
        return Err(ShamirError::NegativeSecret);
    }
    if secret >= &params.prime {
        return Err(ShamirError::SecretTooLarge);
    }
    let poly = Polynomial::with_constant_term(secret, params.threshold - 1, &params.prime)?;

    let shares = (1..=params.total_shares as u32)
        .map(|id| Share::new(id, poly.evaluate(&BigInt::from(id))))
        .collect();
    debug!(
        total = params.total_shares,
        threshold = params.threshold,
        "generated secret shares"
    );
    Ok(shares)
}

/// Recovers the secret from the first `threshold` of `shares`.
pub fn reconstruct_secret(
    shares: &[Share],
    params: &ShamirParameters,
) -> Result<BigInt, ShamirError> {
    if shares.len() < params.threshold {
        return Err(ShamirError::InsufficientShares(
            shares.len(),
            params.threshold,
        ));
    }
    interpolate_at(&shares[..params.threshold], &BigInt::zero(), &params.prime)
}

/// Lagrange interpolation of the polynomial through `shares`, evaluated at `x`:
///
/// `f(x) = Σ_i y_i · Π_{j≠i} (x - x_j) / (x_i - x_j) mod prime`
pub fn interpolate_at(
    shares: &[Share],
    x: &BigInt,
    prime: &BigInt,
) -> Result<BigInt, ShamirError> {
    let mut seen = HashSet::with_capacity(shares.len());
    for share in shares {
        if share.id == 0 {
            return Err(ShamirError::ZeroShareId);
        }
        if !seen.insert(share.id) {
            return Err(ShamirError::DuplicateShareId(share.id));
        }
    }

    let mut result = BigInt::zero();
    for share in shares {
        let x_i = BigInt::from(share.id);
        let mut num = BigInt::one();
        let mut den = BigInt::one();
        for other in shares {
            if other.id != share.id {
                let x_j = BigInt::from(other.id);
                num = (num * (x - &x_j)).mod_floor(prime);
                den = (den * (&x_i - &x_j)).mod_floor(prime);
            }
        }
        let den_inv = mod_inverse(&den, prime).ok_or(ShamirError::NoInverse)?;
        let lagrange_coeff = (num * den_inv).mod_floor(prime);
        result = (result + &share.value * lagrange_coeff).mod_floor(prime);
    }
    Ok(result)
}

/// Checks that `candidate` lies on the polynomial fixed by `other_shares`.
///
/// With fewer than `threshold - 1` other shares there is nothing to judge by
/// and the candidate is accepted. Exactly `threshold - 1` cannot reconstruct
/// the polynomial and the candidate is rejected. This catches an inconsistent
/// dealer; it is not a verifiable secret sharing scheme.
pub fn verify_share(candidate: &Share, other_shares: &[Share], params: &ShamirParameters) -> bool {
    if other_shares.len() + 1 < params.threshold {
        return true;
    }
    if other_shares.len() < params.threshold {
        return false;
    }
    let candidate_value = candidate.value.mod_floor(&params.prime);
    if let Some(same) = other_shares.iter().find(|s| s.id == candidate.id) {
        return same.value.mod_floor(&params.prime) == candidate_value;
    }
    match interpolate_at(
        &other_shares[..params.threshold],
        &BigInt::from(candidate.id),
        &params.prime,
    ) {
        Ok(expected) => expected == candidate_value,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn params_256(total: usize, threshold: usize) -> ShamirParameters {
        ShamirParameters::generate(total, threshold, 256).unwrap()
    }

    fn pick(shares: &[Share], ids: &[u32]) -> Vec<Share> {
        ids.iter()
            .map(|id| shares.iter().find(|s| s.id == *id).unwrap().clone())
            .collect()
    }

    #[test]
    fn test_parameters_validation() {
        let prime = BigInt::from(7919);
        assert!(ShamirParameters::new(5, 3, prime.clone()).is_ok());
        assert!(ShamirParameters::new(5, 5, prime.clone()).is_ok());
        assert!(matches!(
            ShamirParameters::new(3, 5, prime.clone()),
            Err(ShamirError::InvalidParameters(_))
        ));
        assert!(matches!(
            ShamirParameters::new(3, 0, prime.clone()),
            Err(ShamirError::InvalidParameters(_))
        ));
        assert!(matches!(
            ShamirParameters::new(3, 2, BigInt::from(7917)),
            Err(ShamirError::InvalidParameters(_))
        ));
        assert!(matches!(
            ShamirParameters::new(7, 2, BigInt::from(7)),
            Err(ShamirError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_generate_shares_ids() {
        let params = params_256(5, 3);
        let shares = generate_shares(&BigInt::from(424242), &params).unwrap();
        let ids: Vec<u32> = shares.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        for share in &shares {
            assert!(share.value >= BigInt::zero() && &share.value < params.prime());
        }
    }

    #[rstest]
    #[case(&[1, 3, 5])]
    #[case(&[2, 4, 5])]
    #[case(&[5, 1, 2])]
    #[case(&[3, 4, 1])]
    fn test_reconstruct_from_subset(#[case] ids: &[u32]) {
        let params = params_256(5, 3);
        let secret = BigInt::from(424242);
        let shares = generate_shares(&secret, &params).unwrap();
        assert_eq!(reconstruct_secret(&pick(&shares, ids), &params).unwrap(), secret);
    }

    #[test]
    fn test_every_threshold_subset_reconstructs() {
        let params = params_256(5, 3);
        let secret = crate::functions::random_int(200).unwrap();
        let shares = generate_shares(&secret, &params).unwrap();
        for a in 1..=5u32 {
            for b in (a + 1)..=5 {
                for c in (b + 1)..=5 {
                    let subset = pick(&shares, &[a, b, c]);
                    assert_eq!(reconstruct_secret(&subset, &params).unwrap(), secret);
                }
            }
        }
    }

    #[test]
    fn test_reconstruct_uses_first_threshold_shares() {
        let params = params_256(5, 3);
        let secret = BigInt::from(99);
        let mut shares = generate_shares(&secret, &params).unwrap();
        shares[4].value += 1;
        assert_eq!(reconstruct_secret(&shares, &params).unwrap(), secret);
    }

    #[test]
    fn test_reconstruct_with_too_few_shares() {
        let params = params_256(5, 3);
        let secret = BigInt::from(424242);
        let shares = generate_shares(&secret, &params).unwrap();
        assert_eq!(
            reconstruct_secret(&shares[..2], &params),
            Err(ShamirError::InsufficientShares(2, 3))
        );
        // interpolating through threshold - 1 points lands elsewhere
        let guess = interpolate_at(&shares[..2], &BigInt::zero(), params.prime()).unwrap();
        assert_ne!(guess, secret);
    }

    #[test]
    fn test_threshold_one_shares_equal_secret() {
        let params = params_256(3, 1);
        let secret = BigInt::from(17);
        let shares = generate_shares(&secret, &params).unwrap();
        assert!(shares.iter().all(|s| s.value == secret));
    }

    #[test]
    fn test_secret_bounds() {
        let params = ShamirParameters::new(3, 2, BigInt::from(7919)).unwrap();
        assert_eq!(
            generate_shares(&BigInt::from(7919), &params),
            Err(ShamirError::SecretTooLarge)
        );
        assert_eq!(
            generate_shares(&BigInt::from(-1), &params),
            Err(ShamirError::NegativeSecret)
        );
        let shares = generate_shares(&BigInt::from(7918), &params).unwrap();
        assert_eq!(
            reconstruct_secret(&shares, &params).unwrap(),
            BigInt::from(7918)
        );
    }

    #[test]
    fn test_duplicate_and_zero_ids_rejected() {
        let prime = BigInt::from(7919);
        let dup = vec![Share::new(1, BigInt::from(5)), Share::new(1, BigInt::from(6))];
        assert_eq!(
            interpolate_at(&dup, &BigInt::zero(), &prime),
            Err(ShamirError::DuplicateShareId(1))
        );
        let zero = vec![Share::new(0, BigInt::from(5)), Share::new(1, BigInt::from(6))];
        assert_eq!(
            interpolate_at(&zero, &BigInt::zero(), &prime),
            Err(ShamirError::ZeroShareId)
        );
    }

    #[test]
    fn test_verify_share() {
        let params = params_256(5, 3);
        let shares = generate_shares(&BigInt::from(31337), &params).unwrap();
        let others = pick(&shares, &[1, 2, 3]);

        assert!(verify_share(&shares[3], &others, &params));
        assert!(verify_share(&shares[4], &others, &params));
        assert!(verify_share(&shares[0], &others, &params));

        let mut forged = shares[4].clone();
        forged.value += 1;
        assert!(!verify_share(&forged, &others, &params));
    }

    #[test]
    fn test_verify_share_without_enough_context() {
        let params = params_256(5, 3);
        let shares = generate_shares(&BigInt::from(31337), &params).unwrap();
        let mut forged = shares[4].clone();
        forged.value += 1;

        // threshold - 2 others: nothing to judge by
        assert!(verify_share(&forged, &shares[..1], &params));
        assert!(verify_share(&shares[4], &shares[..1], &params));

        // threshold - 1 others: cannot reconstruct, rejected
        assert!(!verify_share(&forged, &shares[..2], &params));
        assert!(!verify_share(&shares[4], &shares[..2], &params));
    }

    #[test]
    fn test_verify_share_threshold_one() {
        let params = params_256(3, 1);
        let shares = generate_shares(&BigInt::from(8), &params).unwrap();
        assert!(!verify_share(&shares[0], &[], &params));
        assert!(verify_share(&shares[0], &shares[1..2], &params));
    }

    #[test]
    fn test_share_zeroize_and_debug() {
        let mut share = Share::new(2, BigInt::from(123456));
        assert!(!format!("{:?}", share).contains("123456"));
        share.zeroize();
        assert_eq!(share.value, BigInt::zero());
        assert_eq!(share.id, 2);
    }

    #[test]
    fn test_parameters_serde_validates() {
        let params = ShamirParameters::new(5, 3, BigInt::from(7919)).unwrap();
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"total_shares":5,"threshold":3,"prime":"7919"}"#);
        let back: ShamirParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);

        let bad = r#"{"total_shares":2,"threshold":3,"prime":"7919"}"#;
        assert!(serde_json::from_str::<ShamirParameters>(bad).is_err());
    }

    #[test]
    fn test_share_serde() {
        let share = Share::new(3, BigInt::from(424242));
        let json = serde_json::to_string(&share).unwrap();
        assert_eq!(json, r#"{"id":3,"value":"424242"}"#);
        let back: Share = serde_json::from_str(&json).unwrap();
        assert_eq!(back, share);
    }
}
