use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A trustee's partial decryption `c^share mod n²` of one aggregate ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialDecryption {
    pub share_id: u32,
    #[serde(with = "crate::encoding::big_int")]
    pub value: BigInt,
}

impl PartialDecryption {
    pub fn new(share_id: u32, value: BigInt) -> Self {
        PartialDecryption { share_id, value }
    }
}
