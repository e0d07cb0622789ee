//! X25519 key agreement.
//!
//! ## Key Pair Derivation
//!
//! DH keys are never taken from signing-key material directly. Each seed is
//! re-hashed and clamped into its own X25519 scalar:
//!
//! ```text
//! secret = clamp(SHA-512(seed)[0..32])
//! public = secret · B
//! ```
//!
//! ## Shared Secret
//!
//! ```text
//! shared = SHA-512(secret · their_public)[0..32]
//! ```
//!
//! The raw Montgomery u-coordinate is never used directly.

use curve25519_dalek::montgomery::MontgomeryPoint;
use zeroize::{Zeroize, ZeroizeOnDrop};

use wraith_core::constants::{PUBLIC_KEY_SIZE, SEED_SIZE, SHARED_SECRET_SIZE};
use wraith_core::error::{Result, WraithError};
use wraith_core::types::{DhKeyPair, DhPublicKey, DhSecretKey};

use crate::hash::sha512_32;

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED SECRET
// ═══════════════════════════════════════════════════════════════════════════════

/// A 32-byte whitened ECDH output.
///
/// Zeroized when dropped. Never expose it in logs or error messages.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; SHARED_SECRET_SIZE]);

impl SharedSecret {
    /// Wraps already-hashed shared secret bytes.
    pub fn from_array(bytes: [u8; SHARED_SECRET_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the secret bytes.
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedSecret([REDACTED])")
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        subtle::ConstantTimeEq::ct_eq(&self.0[..], &other.0[..]).into()
    }
}

impl Eq for SharedSecret {}

// ═══════════════════════════════════════════════════════════════════════════════
// KEY PAIR DERIVATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Applies X25519 scalar clamping.
pub fn clamp(mut scalar: [u8; 32]) -> [u8; 32] {
    scalar[0] &= 248;
    scalar[31] &= 127;
    scalar[31] |= 64;
    scalar
}

/// Derives an X25519 key pair from a 32-byte seed.
///
/// Deterministic: the same seed always yields the same pair.
pub fn derive_dh_keypair(seed: &[u8; SEED_SIZE]) -> DhKeyPair {
    let mut hashed = sha512_32(&[seed]);
    let secret = clamp(hashed);
    hashed.zeroize();

    let public = MontgomeryPoint::mul_base_clamped(secret).to_bytes();
    DhKeyPair::new(
        DhPublicKey::from_array(public),
        DhSecretKey::from_array(secret),
    )
}

/// Generates a key pair from a fresh OS-random seed.
pub fn generate_dh_keypair() -> DhKeyPair {
    use rand::RngCore;

    let mut seed = [0u8; SEED_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut seed);
    let keypair = derive_dh_keypair(&seed);
    seed.zeroize();
    keypair
}

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC KEY VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Checks that `bytes` encode a usable X25519 public key.
///
/// Rejects wrong lengths, non-canonical encodings, points on the quadratic
/// twist, and points of small order.
pub fn validate_public_key(bytes: &[u8]) -> Result<DhPublicKey> {
    let arr: [u8; PUBLIC_KEY_SIZE] = bytes.try_into().map_err(|_| {
        WraithError::InvalidPublicKey(format!(
            "expected {} bytes, got {}",
            PUBLIC_KEY_SIZE,
            bytes.len()
        ))
    })?;

    if arr[31] & 0x80 != 0 {
        return Err(WraithError::InvalidPublicKey(
            "high bit set in u-coordinate".into(),
        ));
    }

    let edwards = MontgomeryPoint(arr)
        .to_edwards(0)
        .ok_or_else(|| WraithError::InvalidPublicKey("point is not on the curve".into()))?;

    if edwards.is_small_order() {
        return Err(WraithError::InvalidPublicKey("point has small order".into()));
    }

    // u >= p decodes to the same point as u - p
    if edwards.to_montgomery().to_bytes() != arr {
        return Err(WraithError::InvalidPublicKey(
            "non-canonical u-coordinate".into(),
        ));
    }

    Ok(DhPublicKey::from_array(arr))
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED SECRET COMPUTATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes the whitened shared secret between `my_secret` and `their_public`.
///
/// # Errors
/// Returns `InvalidPublicKey` if `their_public` fails [`validate_public_key`]
/// or the raw exchange collapses to zero.
pub fn compute_shared_secret(my_secret: &DhSecretKey, their_public: &[u8]) -> Result<SharedSecret> {
    let their_public = validate_public_key(their_public)?;

    let mut raw = MontgomeryPoint(their_public.to_bytes())
        .mul_clamped(*my_secret.as_array())
        .to_bytes();

    if raw.iter().all(|&b| b == 0) {
        return Err(WraithError::InvalidPublicKey(
            "key exchange produced the identity".into(),
        ));
    }

    let shared = sha512_32(&[&raw]);
    raw.zeroize();
    Ok(SharedSecret(shared))
}
