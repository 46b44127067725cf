//! Selector and topic-hash computation.
//!
//! The selector of a function or error is the first 4 bytes of
//! `keccak256(canonical_signature)`; the topic hash of an event is the full
//! 32 bytes:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef

use alloy_primitives::{Selector, B256};
use tiny_keccak::{Hasher, Keccak};

use crate::error::SignatureError;
use crate::signature::normalize_signature;

/// keccak-256 of arbitrary bytes.
pub fn keccak256(data: impl AsRef<[u8]>) -> B256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data.as_ref());
    hasher.finalize(&mut output);
    B256::from(output)
}

/// Hash of an already-canonical signature string.
pub fn hash_canonical(canonical: &str) -> B256 {
    keccak256(canonical.as_bytes())
}

/// First four bytes of a signature hash.
pub fn selector_of(hash: &B256) -> Selector {
    Selector::from_slice(&hash[..4])
}

/// Full 32-byte signature hash of a human-readable or canonical signature.
pub fn signature_hash(signature: &str) -> Result<B256, SignatureError> {
    Ok(hash_canonical(&normalize_signature(signature)?))
}

/// 4-byte selector of a human-readable or canonical signature.
pub fn selector(signature: &str) -> Result<Selector, SignatureError> {
    signature_hash(signature).map(|h| selector_of(&h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_of_selector() {
        let sel = selector("function ownerOf(uint256 tokenId)").unwrap();
        assert_eq!(hex::encode(sel), "6352211e");
    }

    #[test]
    fn transfer_selector_and_alias() {
        let a = selector("transfer(address,uint256)").unwrap();
        let b = selector("function transfer(address to, uint amount) returns (bool)").unwrap();
        assert_eq!(a, b);
        assert_eq!(hex::encode(a), "a9059cbb");
    }

    #[test]
    fn transfer_event_topic() {
        let topic =
            signature_hash("event Transfer(address indexed from, address indexed to, uint256 value)")
                .unwrap();
        assert_eq!(
            hex::encode(topic),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn uniswap_v3_swap_topic() {
        let topic = signature_hash("Swap(address,address,int256,int256,uint160,uint128,int24)").unwrap();
        assert_eq!(
            hex::encode(topic),
            "c42079f94a6350d7e6235f29174924f928cc2ac818eb64fed8004e115fbcca67"
        );
    }

    #[test]
    fn invalid_signature_fails() {
        assert!(selector("ownerOf(uint256").is_err());
    }
}
