use num_bigint::BigInt;
use thiserror::Error;

use crate::ciphertext::Ciphertext;
use crate::priv_key::PrivateKey;
use crate::pub_key::{PubKeyError, PublicKey};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error(transparent)]
    PubKey(#[from] PubKeyError),
    #[error("aggregate of zero ballots is not a ciphertext")]
    EmptyAggregate,
    #[error("tallies were built under different public keys")]
    KeyMismatch,
}

/// Ballot-level operations under one election public key.
#[derive(Debug, Clone)]
pub struct VoteEncryption {
    pub_key: PublicKey,
}

impl VoteEncryption {
    pub fn new(pub_key: PublicKey) -> Self {
        VoteEncryption { pub_key }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.pub_key
    }

    /// Encrypts a choice index. Any value in `[0, n)` is accepted.
    pub fn encrypt_vote(&self, value: &BigInt) -> Result<Ciphertext, VoteError> {
        Ok(self.pub_key.encrypt(value)?)
    }

    /// Homomorphic sum of `ciphertexts`.
    ///
    /// An empty list yields the empty-aggregate placeholder, which every
    /// ciphertext operation refuses with `EmptyAggregate`.
    pub fn aggregate_votes(&self, ciphertexts: &[Ciphertext]) -> Result<Ciphertext, VoteError> {
        let mut iter = ciphertexts.iter();
        let Some(first) = iter.next() else {
            return Ok(Ciphertext::empty_aggregate());
        };
        self.pub_key.check_bounds(first)?;
        let sum = iter.try_fold(first.clone(), |acc, c| self.pub_key.add(&acc, c))?;
        Ok(sum)
    }

    /// [`aggregate_votes`](Self::aggregate_votes) as a parallel reduction.
    #[cfg(feature = "parallel")]
    pub fn aggregate_votes_parallel(
        &self,
        ciphertexts: &[Ciphertext],
    ) -> Result<Ciphertext, VoteError> {
        let sum = ciphertexts
            .par_iter()
            .map(|c| self.pub_key.check_bounds(c).map(|_| c.clone()))
            .try_reduce_with(|a, b| self.pub_key.add(&a, &b));
        match sum {
            Some(sum) => Ok(sum?),
            None => Ok(Ciphertext::empty_aggregate()),
        }
    }

    /// Shape check only; says nothing about which value was encrypted.
    pub fn verify_vote_encryption(&self, c: &Ciphertext) -> bool {
        self.pub_key.verify_ciphertext(c)
    }

    pub fn decrypt_tally(
        &self,
        aggregate: &Ciphertext,
        private_key: &PrivateKey,
    ) -> Result<BigInt, VoteError> {
        if aggregate.is_empty_aggregate() {
            return Err(VoteError::EmptyAggregate);
        }
        Ok(private_key.decrypt(aggregate, &self.pub_key)?)
    }
}

/// Running tally owned by a single writer.
///
/// Tallies built over disjoint ballot batches can be merged in any order.
#[derive(Debug, Clone)]
pub struct VoteTally {
    pub_key: PublicKey,
    aggregate: Option<Ciphertext>,
    count: usize,
}

impl VoteTally {
    pub fn new(pub_key: PublicKey) -> Self {
        VoteTally {
            pub_key,
            aggregate: None,
            count: 0,
        }
    }

    pub fn push(&mut self, c: &Ciphertext) -> Result<(), VoteError> {
        let next = match &self.aggregate {
            Some(acc) => self.pub_key.add(acc, c)?,
            None => {
                self.pub_key.check_bounds(c)?;
                c.clone()
            }
        };
        self.aggregate = Some(next);
        self.count += 1;
        Ok(())
    }

    pub fn merge(&mut self, other: VoteTally) -> Result<(), VoteError> {
        if self.pub_key != other.pub_key {
            return Err(VoteError::KeyMismatch);
        }
        if let Some(theirs) = other.aggregate {
            let next = match &self.aggregate {
                Some(ours) => self.pub_key.add(ours, &theirs)?,
                None => theirs,
            };
            self.aggregate = Some(next);
        }
        self.count += other.count;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn ciphertext(&self) -> Result<&Ciphertext, VoteError> {
        self.aggregate.as_ref().ok_or(VoteError::EmptyAggregate)
    }

    pub fn into_ciphertext(self) -> Result<Ciphertext, VoteError> {
        self.aggregate.ok_or(VoteError::EmptyAggregate)
    }
}
