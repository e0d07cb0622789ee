//! Key types for Wraith.
//!
//! This module defines the key structures used in the protocol:
//!
//! - [`SeedMaterial`]: The wallet signature split into scan and spend seeds
//! - [`DhPublicKey`]: X25519 public key (32 bytes)
//! - [`DhSecretKey`]: Clamped X25519 scalar (32 bytes, zeroized on drop)
//! - [`DhKeyPair`]: Combined public + secret key
//! - [`SpendPublicKey`]: Ed25519 public key identifying the spend role

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{DH_SECRET_KEY_SIZE, PUBLIC_KEY_SIZE, SEED_SIZE, SIGNATURE_SIZE};
use crate::error::{Result, WraithError};

// ═══════════════════════════════════════════════════════════════════════════════
// SEED MATERIAL
// ═══════════════════════════════════════════════════════════════════════════════

/// The two seed roles split from a 64-byte wallet signature.
///
/// Bytes 0..32 are the scan seed, bytes 32..64 the spend seed. Seed material
/// is never persisted: callers re-sign the domain message each session and
/// re-derive it. Zeroized on drop; `Debug` never shows the bytes.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SeedMaterial {
    scan_seed: [u8; SEED_SIZE],
    spend_seed: [u8; SEED_SIZE],
}

impl SeedMaterial {
    /// Splits a wallet signature into scan and spend seeds.
    ///
    /// # Errors
    /// Returns `InvalidSeedLength` unless the signature is exactly 64 bytes.
    pub fn from_signature(signature: &[u8]) -> Result<Self> {
        if signature.len() != SIGNATURE_SIZE {
            return Err(WraithError::InvalidSeedLength {
                expected: SIGNATURE_SIZE,
                actual: signature.len(),
            });
        }

        let mut scan_seed = [0u8; SEED_SIZE];
        let mut spend_seed = [0u8; SEED_SIZE];
        scan_seed.copy_from_slice(&signature[..SEED_SIZE]);
        spend_seed.copy_from_slice(&signature[SEED_SIZE..]);

        Ok(Self {
            scan_seed,
            spend_seed,
        })
    }

    /// Builds seed material from already-split seeds.
    pub fn from_seeds(scan_seed: [u8; SEED_SIZE], spend_seed: [u8; SEED_SIZE]) -> Self {
        Self {
            scan_seed,
            spend_seed,
        }
    }

    /// Returns the scan seed.
    ///
    /// # Security
    /// Handle the returned bytes carefully - do not log or expose them.
    pub fn scan_seed(&self) -> &[u8; SEED_SIZE] {
        &self.scan_seed
    }

    /// Returns the spend seed.
    ///
    /// # Security
    /// Handle the returned bytes carefully - do not log or expose them.
    pub fn spend_seed(&self) -> &[u8; SEED_SIZE] {
        &self.spend_seed
    }
}

impl std::fmt::Debug for SeedMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SeedMaterial([REDACTED])")
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIFFIE-HELLMAN KEYS
// ═══════════════════════════════════════════════════════════════════════════════

/// X25519 public key (Montgomery u-coordinate).
///
/// Safe to share. Curve validity is checked by the crypto layer, not here.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DhPublicKey([u8; PUBLIC_KEY_SIZE]);

impl_base58_key!(DhPublicKey, PUBLIC_KEY_SIZE, WraithError::InvalidPublicKey);

/// Clamped X25519 secret scalar.
///
/// Zeroized when dropped. Never expose this key in logs or error messages.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DhSecretKey {
    bytes: [u8; DH_SECRET_KEY_SIZE],
}

impl DhSecretKey {
    /// Creates a secret key from a fixed-size array.
    pub fn from_array(bytes: [u8; DH_SECRET_KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the secret key as a fixed-size array reference.
    ///
    /// # Security
    /// Handle the returned bytes carefully - do not log or expose them.
    pub fn as_array(&self) -> &[u8; DH_SECRET_KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for DhSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DhSecretKey([REDACTED])")
    }
}

/// A complete X25519 key pair.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DhKeyPair {
    /// Public key (safe to share)
    #[zeroize(skip)]
    pub public: DhPublicKey,
    /// Secret key (keep private, auto-zeroized)
    pub secret: DhSecretKey,
}

impl DhKeyPair {
    /// Creates a new key pair from public and secret keys.
    pub fn new(public: DhPublicKey, secret: DhSecretKey) -> Self {
        Self { public, secret }
    }
}

impl std::fmt::Debug for DhKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhKeyPair")
            .field("public", &self.public)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPEND IDENTITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Ed25519 public key of the spend seed.
///
/// Senders bind it into every stealth address they derive for this recipient;
/// the recipient recomputes it from the spend seed while scanning.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpendPublicKey([u8; PUBLIC_KEY_SIZE]);

impl_base58_key!(SpendPublicKey, PUBLIC_KEY_SIZE, WraithError::InvalidPublicKey);

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_signature() -> Vec<u8> {
        let mut sig = vec![0x01u8; 32];
        sig.extend_from_slice(&[0x02u8; 32]);
        sig
    }

    #[test]
    fn test_seed_material_split() {
        let seeds = SeedMaterial::from_signature(&fixture_signature()).unwrap();
        assert_eq!(seeds.scan_seed(), &[0x01u8; 32]);
        assert_eq!(seeds.spend_seed(), &[0x02u8; 32]);
    }

    #[test]
    fn test_seed_material_wrong_length() {
        for len in [0usize, 32, 63, 65, 128] {
            let result = SeedMaterial::from_signature(&vec![0xAA; len]);
            assert!(matches!(
                result,
                Err(WraithError::InvalidSeedLength { expected: 64, actual }) if actual == len
            ));
        }
    }

    #[test]
    fn test_seed_material_debug_redacted() {
        let seeds = SeedMaterial::from_signature(&fixture_signature()).unwrap();
        let debug = format!("{:?}", seeds);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("01"));
    }

    #[test]
    fn test_secret_key_debug_redacted() {
        let sk = DhSecretKey::from_array([0x42; 32]);
        let debug = format!("{:?}", sk);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("42"));
    }

    #[test]
    fn test_public_key_wrong_size() {
        let result = DhPublicKey::from_bytes(&[0u8; 31]);
        assert!(matches!(result, Err(WraithError::InvalidPublicKey(_))));
    }

    #[test]
    fn test_public_key_base58() {
        let pk = DhPublicKey::from_array([0xAB; 32]);
        let parsed: DhPublicKey = pk.to_base58().parse().unwrap();
        assert_eq!(pk, parsed);

        // Decodes, but to the wrong length
        let short = bs58::encode([0xAB; 31]).into_string();
        assert!(matches!(
            DhPublicKey::from_base58(&short),
            Err(WraithError::EncodingError(_))
        ));

        // '0' is not in the base58 alphabet
        assert!(matches!(
            DhPublicKey::from_base58("0OIl"),
            Err(WraithError::EncodingError(_))
        ));
    }

    proptest::proptest! {
        #[test]
        fn prop_seed_split_is_exact(sig in proptest::collection::vec(proptest::prelude::any::<u8>(), 64)) {
            let seeds = SeedMaterial::from_signature(&sig).unwrap();
            proptest::prop_assert_eq!(&seeds.scan_seed()[..], &sig[..32]);
            proptest::prop_assert_eq!(&seeds.spend_seed()[..], &sig[32..]);
        }
    }

    #[test]
    fn test_public_key_serde() {
        let pk = SpendPublicKey::from_array([0x12; 32]);
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json, format!("\"{}\"", pk.to_base58()));
        let pk2: SpendPublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(pk, pk2);
    }
}
