//! Domain types for Wraith.
//!
//! This module provides all the core data structures used throughout the protocol:
//!
//! - [`SeedMaterial`]: Scan and spend seeds split from a wallet signature
//! - [`DhKeyPair`]: X25519 key pair used for the Diffie-Hellman exchange
//! - [`MetaAddress`]: Published pair of scan and spend public keys
//! - [`StealthAddress`]: One-time address for a specific payment
//! - [`BreadcrumbRecord`]: Ephemeral key + recorded address handed to the scanner

/// Implements the shared surface of a fixed-size, base58-displayed byte key.
///
/// `$err` is the error variant raised when raw bytes have the wrong length.
macro_rules! impl_base58_key {
    ($name:ident, $size:expr, $err:path) => {
        impl $name {
            /// Creates the value from raw bytes.
            ///
            /// # Errors
            /// Returns error if the byte length is wrong.
            pub fn from_bytes(bytes: &[u8]) -> $crate::error::Result<Self> {
                let arr: [u8; $size] = bytes.try_into().map_err(|_| {
                    $err(format!("expected {} bytes, got {}", $size, bytes.len()))
                })?;
                Ok(Self(arr))
            }

            /// Creates the value from a fixed-size array.
            pub const fn from_array(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }

            /// Returns the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $size] {
                &self.0
            }

            /// Returns a copy of the raw bytes.
            pub fn to_bytes(&self) -> [u8; $size] {
                self.0
            }

            /// Returns the base58 encoding of the raw bytes.
            pub fn to_base58(&self) -> String {
                bs58::encode(&self.0).into_string()
            }

            /// Parses from base58.
            ///
            /// # Errors
            /// Returns `EncodingError` for malformed base58 or a length mismatch.
            pub fn from_base58(s: &str) -> $crate::error::Result<Self> {
                let bytes = bs58::decode(s.trim()).into_vec().map_err(|e| {
                    $crate::error::WraithError::EncodingError(format!("invalid base58: {}", e))
                })?;
                let arr: [u8; $size] = bytes.as_slice().try_into().map_err(|_| {
                    $crate::error::WraithError::EncodingError(format!(
                        "expected {} bytes, decoded {}",
                        $size,
                        bytes.len()
                    ))
                })?;
                Ok(Self(arr))
            }

            /// Returns the hex encoding of the raw bytes.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Returns true if every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|&b| b == 0)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_base58())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_base58())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::WraithError;

            fn from_str(s: &str) -> $crate::error::Result<Self> {
                Self::from_base58(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.to_base58())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::from_base58(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

mod keys;
mod address;
mod breadcrumb;

pub use keys::*;
pub use address::*;
pub use breadcrumb::*;
