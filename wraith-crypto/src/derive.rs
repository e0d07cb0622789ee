//! Stealth key and address derivation.
//!
//! ## Derivation Flow
//!
//! ```text
//! shared_secret, spend_public_key
//!       ↓
//! stealth_seed = SHA-512(shared_secret || spend_public_key)[0..32]
//!       ↓
//! Ed25519 signing key from stealth_seed
//!       ↓
//! stealth_address = verifying key bytes
//! ```
//!
//! A fresh ephemeral key per payment gives a fresh shared secret, so two
//! payments to one recipient never share an address even though the spend
//! identity is fixed.
//!
//! Anyone holding the shared secret can run this derivation, which includes
//! the sender. The resulting key proves receipt; it does not custody funds.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroize;

use wraith_core::constants::SEED_SIZE;
use wraith_core::error::{Result, WraithError};
use wraith_core::types::{SpendPublicKey, StealthAddress};

use crate::dh::SharedSecret;
use crate::hash::sha512_32;

/// One-time Ed25519 key pair for a single stealth payment.
///
/// The inner signing key zeroizes itself on drop.
pub struct StealthKeypair {
    signing_key: SigningKey,
}

impl StealthKeypair {
    /// Builds the key pair from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; SEED_SIZE]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Returns the stealth address (the Ed25519 public key).
    pub fn address(&self) -> StealthAddress {
        StealthAddress::from_array(self.signing_key.verifying_key().to_bytes())
    }

    /// Returns the 32-byte Ed25519 seed.
    ///
    /// # Security
    /// Handle the returned bytes carefully - do not log or expose them.
    pub fn secret_seed(&self) -> [u8; SEED_SIZE] {
        self.signing_key.to_bytes()
    }

    /// Returns the 64-byte `seed || public` layout wallets import.
    pub fn to_keypair_bytes(&self) -> [u8; 64] {
        self.signing_key.to_keypair_bytes()
    }

    /// Signs `message` with the stealth key.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Verifies a signature made by this key.
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        verify_signature(&self.address(), message, signature).is_ok()
    }
}

impl std::fmt::Debug for StealthKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StealthKeypair")
            .field("address", &self.address())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPEND IDENTITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Derives the Ed25519 public key of the spend seed.
pub fn spend_public_key(spend_seed: &[u8; SEED_SIZE]) -> SpendPublicKey {
    let signing_key = SigningKey::from_bytes(spend_seed);
    SpendPublicKey::from_array(signing_key.verifying_key().to_bytes())
}

/// Checks that a published spend key decompresses to an Ed25519 point.
pub fn validate_spend_public_key(key: &SpendPublicKey) -> Result<()> {
    VerifyingKey::from_bytes(key.as_bytes())
        .map(|_| ())
        .map_err(|_| WraithError::InvalidPublicKey("spend key is not an Ed25519 point".into()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEALTH DERIVATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Derives the one-time stealth key pair for a shared secret and spend identity.
pub fn derive_stealth_keypair(
    shared_secret: &SharedSecret,
    spend_public_key: &SpendPublicKey,
) -> StealthKeypair {
    let mut seed = sha512_32(&[shared_secret.as_bytes(), spend_public_key.as_bytes()]);
    let keypair = StealthKeypair::from_seed(&seed);
    seed.zeroize();
    keypair
}

/// Derives only the address (for senders who don't need the key).
pub fn derive_stealth_address(
    shared_secret: &SharedSecret,
    spend_public_key: &SpendPublicKey,
) -> StealthAddress {
    derive_stealth_keypair(shared_secret, spend_public_key).address()
}

// ═══════════════════════════════════════════════════════════════════════════════
// VERIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Compares two stealth addresses in constant time.
pub fn verify_stealth_address(candidate: &StealthAddress, expected: &StealthAddress) -> bool {
    subtle::ConstantTimeEq::ct_eq(&candidate.as_bytes()[..], &expected.as_bytes()[..]).into()
}

/// Verifies an Ed25519 signature against a stealth address.
///
/// # Errors
/// Returns `InvalidStealthAddress` if the address is not a valid Ed25519
/// point, `ValidationError` if the signature does not verify.
pub fn verify_signature(
    address: &StealthAddress,
    message: &[u8],
    signature: &[u8; 64],
) -> Result<()> {
    let verifying_key = VerifyingKey::from_bytes(address.as_bytes())
        .map_err(|e| WraithError::InvalidStealthAddress(e.to_string()))?;
    verifying_key
        .verify(message, &Signature::from_bytes(signature))
        .map_err(|_| WraithError::ValidationError("signature does not verify".into()))
}
