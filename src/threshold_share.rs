use num_traits::Signed;

use crate::ciphertext::Ciphertext;
use crate::decryption_share::PartialDecryption;
use crate::pub_key::{PubKeyError, PublicKey};
use crate::shamir::Share;

/// A trustee's share of the decryption exponent, bound to the election key.
///
/// The share value is cleared when the `KeyShare` is dropped.
#[derive(Debug, Clone)]
pub struct KeyShare {
    pub pub_key: PublicKey,
    pub share: Share,
}

impl KeyShare {
    pub fn new(pub_key: PublicKey, share: Share) -> Self {
        KeyShare { pub_key, share }
    }

    pub fn id(&self) -> u32 {
        self.share.id
    }

    pub fn partial_decrypt(&self, c: &Ciphertext) -> Result<PartialDecryption, PubKeyError> {
        partial_decrypt(c, &self.share, &self.pub_key)
    }
}

/// `c^share mod n²`. Rejects the empty-aggregate placeholder, out-of-range
/// values, and negative share exponents.
pub fn partial_decrypt(
    c: &Ciphertext,
    share: &Share,
    pub_key: &PublicKey,
) -> Result<PartialDecryption, PubKeyError> {
    pub_key.check_bounds(c)?;
    if share.value.is_negative() {
        return Err(PubKeyError::NegativeShare(share.id));
    }
    let pd = c.value().modpow(&share.value, pub_key.n_squared());
    Ok(PartialDecryption::new(share.id, pd))
}
