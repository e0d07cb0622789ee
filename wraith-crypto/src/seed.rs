//! Meta-key derivation from a wallet signature.
//!
//! The wallet signs the fixed domain message; the 64-byte signature is the
//! root of every key the recipient holds. Nothing here is stored: calling
//! again with a re-signed message rebuilds the identical key set.
//!
//! ```text
//! signature[0..32]  → scan seed  → X25519 scan key pair
//! signature[32..64] → spend seed → Ed25519 spend identity
//! ```

use tracing::debug;

use wraith_core::error::Result;
use wraith_core::types::{MetaAddress, SeedMaterial};

use crate::derive::spend_public_key;
use crate::dh::derive_dh_keypair;

/// Splits a 64-byte signature into scan and spend seeds.
///
/// # Errors
/// Returns `InvalidSeedLength` unless `signature` is exactly 64 bytes.
pub fn derive_meta_keys(signature: &[u8]) -> Result<SeedMaterial> {
    SeedMaterial::from_signature(signature)
}

/// Computes the public meta-address for a set of seeds.
pub fn derive_meta_address(seeds: &SeedMaterial) -> MetaAddress {
    let scan = derive_dh_keypair(seeds.scan_seed());
    let spend = spend_public_key(seeds.spend_seed());

    let meta = MetaAddress::new(scan.public, spend);
    debug!(scan = %meta.scan_public_key, spend = %meta.spend_public_key, "derived meta-address");
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use wraith_core::error::WraithError;

    fn fixture_signature() -> Vec<u8> {
        let mut sig = vec![0x01u8; 32];
        sig.extend_from_slice(&[0x02u8; 32]);
        sig
    }

    #[test]
    fn test_derive_meta_keys_deterministic() {
        let a = derive_meta_keys(&fixture_signature()).unwrap();
        let b = derive_meta_keys(&fixture_signature()).unwrap();
        assert_eq!(a.scan_seed(), b.scan_seed());
        assert_eq!(a.spend_seed(), b.spend_seed());
        assert_eq!(derive_meta_address(&a), derive_meta_address(&b));
    }

    #[test]
    fn test_derive_meta_keys_rejects_short_signature() {
        assert!(matches!(
            derive_meta_keys(&[0u8; 63]),
            Err(WraithError::InvalidSeedLength {
                expected: 64,
                actual: 63
            })
        ));
    }

    #[test]
    fn test_meta_address_golden() {
        let seeds = derive_meta_keys(&fixture_signature()).unwrap();
        let meta = derive_meta_address(&seeds);

        assert_eq!(
            meta.scan_public_key.to_hex(),
            "1b1b58dd50ea14b60da17b790cd02754d970c9bab864ebb3c0f3016fe51d3f57"
        );
        assert_eq!(
            meta.spend_public_key.to_hex(),
            "8139770ea87d175f56a35466c34c7ecccb8d8a91b4ee37a25df60f5b8fc9b394"
        );
        assert_eq!(
            meta.encode(),
            "wraith:2ppCEsHFnroogNMwnmeTN1kCteCWy7QaxWDGcjW9F5cA:9hSR6S7WPtxmTojgo6GG3k4yDPecgJY292j7xrsUGWBu"
        );
    }

    #[test]
    fn test_scan_and_spend_roles_are_separated() {
        // Same 32 bytes in both halves still yield unrelated public keys
        let seeds = derive_meta_keys(&[0x05u8; 64]).unwrap();
        let meta = derive_meta_address(&seeds);
        assert_ne!(meta.scan_public_key.as_bytes(), meta.spend_public_key.as_bytes());
    }
}
