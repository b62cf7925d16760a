//! This crate implements the Paillier cryptosystem for encrypted vote tallying.
//!
//! Based on:
//! [Paillier, 1999](https://link.springer.com/chapter/10.1007/3-540-48910-X_16)
//! and [Shamir, 1979](https://dl.acm.org/doi/10.1145/359168.359176).
//! This crate provides key generation, ballot encryption, homomorphic
//! aggregation, and Shamir sharing of the decryption exponent among trustees.
//!
//! # Example
//! ```
//! use num_bigint::BigInt;
//! use tally_paillier::{generate_key_pair, VoteEncryption};
//!
//! let (public_key, private_key) = generate_key_pair(256).unwrap().into_parts();
//! let votes = VoteEncryption::new(public_key);
//!
//! let ballots: Vec<_> = [1, 0, 1, 1, 0]
//!     .iter()
//!     .map(|v| votes.encrypt_vote(&BigInt::from(*v)).unwrap())
//!     .collect();
//! let tally = votes.aggregate_votes(&ballots).unwrap();
//! assert_eq!(votes.decrypt_tally(&tally, &private_key).unwrap(), BigInt::from(3));
//! ```
//!
//! # Threshold decryption
//!
//! [`ThresholdPaillier`] combines partial decryptions by a plain product
//! mod `n²`, which recovers the plaintext only for threshold 1. See the
//! [`tcpaillier`] module docs.

pub mod ciphertext;
pub mod config;
pub mod decryption_share;
pub mod encoding;
pub mod functions;
pub mod keygen;
pub mod polynomial;
pub mod priv_key;
pub mod pub_key;
pub mod shamir;
pub mod tcpaillier;
pub mod threshold_share;
pub mod vote;

pub use ciphertext::Ciphertext;
pub use config::{ConfigError, CryptoConfig};
pub use decryption_share::PartialDecryption;
pub use keygen::{generate_key_pair, generate_key_pair_with_timeout, KeyGenError, KeyPair};
pub use priv_key::PrivateKey;
pub use pub_key::{PubKeyError, PublicKey};
pub use shamir::{ShamirError, ShamirParameters, Share};
pub use tcpaillier::{ElectionKeys, ThresholdError, ThresholdPaillier};
pub use threshold_share::KeyShare;
pub use vote::{VoteEncryption, VoteError, VoteTally};
