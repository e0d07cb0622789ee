//! # Wraith Cryptography
//!
//! Curve primitives for the Wraith stealth address protocol.
//!
//! This crate provides:
//!
//! - **Seed**: splitting a wallet signature into scan and spend seeds
//! - **DH**: X25519 key pairs re-derived from seeds, validated ECDH
//! - **Hash**: truncated SHA-512, the one hash used throughout
//! - **Derivation**: one-time Ed25519 stealth keys from a shared secret
//!
//! ## Security Properties
//!
//! - Signing keys and DH keys never share raw key material
//! - Peer public keys are checked for curve membership and small order
//! - Seeds, DH secrets and shared secrets are zeroized on drop
//!
//! ## Example
//!
//! ```rust
//! use wraith_crypto::{compute_shared_secret, derive_dh_keypair, derive_stealth_address, spend_public_key};
//!
//! let recipient_scan = derive_dh_keypair(&[1u8; 32]);
//! let recipient_spend = spend_public_key(&[2u8; 32]);
//! let ephemeral = derive_dh_keypair(&[3u8; 32]);
//!
//! // Sender side
//! let shared = compute_shared_secret(&ephemeral.secret, recipient_scan.public.as_bytes()).unwrap();
//! let address = derive_stealth_address(&shared, &recipient_spend);
//!
//! // Recipient side arrives at the same address
//! let shared = compute_shared_secret(&recipient_scan.secret, ephemeral.public.as_bytes()).unwrap();
//! assert_eq!(derive_stealth_address(&shared, &recipient_spend), address);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod derive;
pub mod dh;
pub mod hash;
pub mod seed;

#[cfg(test)]
mod test_vectors;

// Re-export main functions at crate root
pub use derive::{
    derive_stealth_address, derive_stealth_keypair, spend_public_key, validate_spend_public_key,
    verify_signature, verify_stealth_address, StealthKeypair,
};
pub use dh::{
    compute_shared_secret, derive_dh_keypair, generate_dh_keypair, validate_public_key,
    SharedSecret,
};
pub use hash::sha512_32;
pub use seed::{derive_meta_address, derive_meta_keys};
