//! Hashing utilities.
//!
//! Every derivation in the protocol uses the same primitive: SHA-512 over
//! the concatenated inputs, truncated to the first 32 bytes.
//!
//! ```text
//! output = SHA-512(part_0 || part_1 || ... )[0..32]
//! ```
//!
//! Parts are concatenated without length prefixes. Every caller hashes
//! fixed-size fields, so the encoding is unambiguous.

use sha2::{Digest, Sha512};

/// Computes SHA-512 over the concatenation of `parts` and keeps 32 bytes.
pub fn sha512_32(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();

    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    out
}
