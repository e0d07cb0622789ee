//! Address types for Wraith.
//!
//! - [`MetaAddress`]: A recipient's published scan + spend public keys
//! - [`StealthAddress`]: A one-time address derived for a single payment
//! - [`LedgerAddress`]: An ordinary ledger account (sender, settlement)

use serde::{Deserialize, Serialize};

use crate::constants::{
    LEDGER_ADDRESS_SIZE, META_ADDRESS_PREFIX, META_ADDRESS_SERIALIZED_SIZE, PROTOCOL_VERSION,
    PUBLIC_KEY_SIZE, STEALTH_ADDRESS_SIZE,
};
use crate::error::{Result, WraithError};
use crate::types::{DhPublicKey, SpendPublicKey};

// ═══════════════════════════════════════════════════════════════════════════════
// META-ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A recipient's long-lived published key pair.
///
/// The scan key is an X25519 public key senders run ECDH against. The spend
/// key is the Ed25519 identity bound into every derived stealth address.
/// One meta-address yields an unlimited number of unlinkable stealth addresses.
///
/// # Wire Format (binary)
/// ```text
/// version (1) || scan_public_key (32) || spend_public_key (32)
/// ```
///
/// # Text Format
/// ```text
/// wraith:<base58 scan_public_key>:<base58 spend_public_key>
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaAddress {
    /// Encoding version
    pub version: u8,
    /// X25519 scan public key
    pub scan_public_key: DhPublicKey,
    /// Ed25519 spend public key
    pub spend_public_key: SpendPublicKey,
}

impl MetaAddress {
    /// Creates a meta-address at the current protocol version.
    pub fn new(scan_public_key: DhPublicKey, spend_public_key: SpendPublicKey) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            scan_public_key,
            spend_public_key,
        }
    }

    /// Validates structure: version and non-degenerate keys.
    ///
    /// Curve membership of the keys is checked where they are used.
    pub fn validate(&self) -> Result<()> {
        if self.version != PROTOCOL_VERSION {
            return Err(WraithError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                actual: self.version,
            });
        }

        if self.scan_public_key.is_zero() {
            return Err(WraithError::InvalidMetaAddress(
                "scan public key is all zeros".into(),
            ));
        }

        if self.spend_public_key.is_zero() {
            return Err(WraithError::InvalidMetaAddress(
                "spend public key is all zeros".into(),
            ));
        }

        Ok(())
    }

    /// Serializes to compact binary format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(META_ADDRESS_SERIALIZED_SIZE);
        bytes.push(self.version);
        bytes.extend_from_slice(self.scan_public_key.as_bytes());
        bytes.extend_from_slice(self.spend_public_key.as_bytes());
        bytes
    }

    /// Deserializes from compact binary format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != META_ADDRESS_SERIALIZED_SIZE {
            return Err(WraithError::InvalidMetaAddress(format!(
                "expected {} bytes, got {}",
                META_ADDRESS_SERIALIZED_SIZE,
                bytes.len()
            )));
        }

        let scan_end = 1 + PUBLIC_KEY_SIZE;
        let meta = Self {
            version: bytes[0],
            scan_public_key: DhPublicKey::from_bytes(&bytes[1..scan_end])?,
            spend_public_key: SpendPublicKey::from_bytes(&bytes[scan_end..])?,
        };

        meta.validate()?;
        Ok(meta)
    }

    /// Encodes to the shareable text form.
    pub fn encode(&self) -> String {
        format!(
            "{}:{}:{}",
            META_ADDRESS_PREFIX,
            self.scan_public_key.to_base58(),
            self.spend_public_key.to_base58()
        )
    }

    /// Decodes the shareable text form.
    pub fn decode(s: &str) -> Result<Self> {
        let mut parts = s.trim().split(':');
        let (prefix, scan, spend) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(scan), Some(spend), None) => (prefix, scan, spend),
            _ => {
                return Err(WraithError::InvalidMetaAddress(format!(
                    "expected {}:<scan>:<spend>",
                    META_ADDRESS_PREFIX
                )))
            }
        };

        if prefix != META_ADDRESS_PREFIX {
            return Err(WraithError::InvalidMetaAddress(format!(
                "unknown prefix '{}'",
                prefix
            )));
        }

        let scan_public_key = DhPublicKey::from_base58(scan)
            .map_err(|e| WraithError::InvalidMetaAddress(format!("scan key: {}", e)))?;
        let spend_public_key = SpendPublicKey::from_base58(spend)
            .map_err(|e| WraithError::InvalidMetaAddress(format!("spend key: {}", e)))?;

        let meta = Self::new(scan_public_key, spend_public_key);
        meta.validate()?;
        Ok(meta)
    }

    /// Encodes to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Decodes from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Display for MetaAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

impl std::str::FromStr for MetaAddress {
    type Err = WraithError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEALTH ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A one-time address derived for a single payment.
///
/// This is the Ed25519 public key of the derived stealth signing key. Only
/// the recipient (by scanning) can tie it back to their meta-address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StealthAddress([u8; STEALTH_ADDRESS_SIZE]);

impl_base58_key!(StealthAddress, STEALTH_ADDRESS_SIZE, WraithError::InvalidStealthAddress);

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// An ordinary ledger account: the paying key or the settlement destination.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedgerAddress([u8; LEDGER_ADDRESS_SIZE]);

impl_base58_key!(LedgerAddress, LEDGER_ADDRESS_SIZE, WraithError::ValidationError);
