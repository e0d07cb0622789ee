//! Protocol constants for Wraith.
//!
//! Key sizes follow X25519 (RFC 7748) and Ed25519 (RFC 8032). The domain
//! message is part of the external contract: wallets sign it to produce the
//! seed material, so it must change whenever the derivation pipeline changes.

// ═══════════════════════════════════════════════════════════════════════════════
// DOMAIN SEPARATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Message a wallet signs to produce the 64-byte seed material.
///
/// The `-v1` suffix is the derivation version. Bump it together with
/// [`DOMAIN_VERSION`] whenever any step of key derivation changes, so old and
/// new key spaces are never mixed silently.
pub const DOMAIN_MESSAGE: &[u8] = b"wraith-stealth-keys-v1";

/// Derivation version encoded in [`DOMAIN_MESSAGE`].
pub const DOMAIN_VERSION: u8 = 1;

/// Current meta-address encoding version.
pub const PROTOCOL_VERSION: u8 = 1;

/// Prefix of the textual meta-address form (`wraith:<scan>:<spend>`).
pub const META_ADDRESS_PREFIX: &str = "wraith";

// ═══════════════════════════════════════════════════════════════════════════════
// SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of the wallet signature used as seed material.
pub const SIGNATURE_SIZE: usize = 64;

/// Size of each seed role (scan, spend) split from the signature.
pub const SEED_SIZE: usize = 32;

/// Size of an X25519 or Ed25519 public key.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of an X25519 secret scalar.
pub const DH_SECRET_KEY_SIZE: usize = 32;

/// Size of the hashed ECDH shared secret.
pub const SHARED_SECRET_SIZE: usize = 32;

/// Size of a one-time stealth address (an Ed25519 public key).
pub const STEALTH_ADDRESS_SIZE: usize = 32;

/// Size of a ledger account address.
pub const LEDGER_ADDRESS_SIZE: usize = 32;

/// Size of the serialized meta-address (version + scan key + spend key).
/// 1 + 32 + 32 = 65 bytes
pub const META_ADDRESS_SERIALIZED_SIZE: usize = 1 + PUBLIC_KEY_SIZE + PUBLIC_KEY_SIZE;

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER PROGRAM IDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Native value-transfer program (base58).
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// Memo program that carries the breadcrumb alongside the transfer (base58).
pub const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

// ═══════════════════════════════════════════════════════════════════════════════
// PERFORMANCE TUNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Default number of candidates handed to the worker pool per batch.
pub const DEFAULT_SCAN_BATCH_SIZE: usize = 1000;

/// Maximum candidates per batch.
pub const MAX_SCAN_BATCH_SIZE: usize = 10_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_message_is_versioned() {
        let message = std::str::from_utf8(DOMAIN_MESSAGE).unwrap();
        assert!(message.ends_with(&format!("-v{}", DOMAIN_VERSION)));
    }

    #[test]
    fn test_signature_splits_into_two_seeds() {
        assert_eq!(SIGNATURE_SIZE, 2 * SEED_SIZE);
    }

    #[test]
    fn test_meta_address_size() {
        // version (1) + scan_pk (32) + spend_pk (32)
        assert_eq!(META_ADDRESS_SERIALIZED_SIZE, 65);
    }

    #[test]
    fn test_program_ids_decode_to_32_bytes() {
        for id in [SYSTEM_PROGRAM_ID, MEMO_PROGRAM_ID] {
            let bytes = bs58::decode(id).into_vec().unwrap();
            assert_eq!(bytes.len(), LEDGER_ADDRESS_SIZE);
        }
    }
}
