//! Breadcrumb types.
//!
//! A breadcrumb is the ephemeral public key a sender publishes next to a
//! payment. Recipients later feed breadcrumb records back into the scanner.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WraithError};
use crate::types::{DhPublicKey, StealthAddress};

/// The ephemeral public key published with a payment.
///
/// On the ledger it travels as the base58 text of its 32 raw bytes inside a
/// memo. The memo is opaque bytes to this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    ephemeral_public_key: DhPublicKey,
}

impl Breadcrumb {
    /// Wraps an ephemeral public key.
    pub fn new(ephemeral_public_key: DhPublicKey) -> Self {
        Self {
            ephemeral_public_key,
        }
    }

    /// Returns the ephemeral public key.
    pub fn ephemeral_public_key(&self) -> &DhPublicKey {
        &self.ephemeral_public_key
    }

    /// Returns the base58 text carried in the memo.
    pub fn to_base58(&self) -> String {
        self.ephemeral_public_key.to_base58()
    }

    /// Returns the memo payload bytes.
    pub fn to_memo(&self) -> Vec<u8> {
        self.to_base58().into_bytes()
    }

    /// Parses a memo payload.
    ///
    /// # Errors
    /// Returns `EncodingError` if the memo is not UTF-8 base58 of 32 bytes.
    pub fn from_memo(memo: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(memo)
            .map_err(|_| WraithError::EncodingError("memo is not valid UTF-8".into()))?;
        Ok(Self::new(DhPublicKey::from_base58(text)?))
    }
}

/// A breadcrumb as supplied by the ledger indexer.
///
/// String fields are kept exactly as received, so one malformed record is
/// detected (and skipped) during scanning instead of poisoning a whole batch
/// at ingestion time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbRecord {
    /// Identifier assigned by the source (0 until stored)
    #[serde(default)]
    pub id: u64,
    /// Base58 ephemeral public key from the memo
    pub ephemeral_public_key: String,
    /// Base58 stealth address recorded at payment time
    pub recorded_stealth_address: String,
    /// Ledger transaction reference (signature / hash)
    pub tx_ref: String,
    /// Unix timestamp (seconds) of the transaction
    #[serde(default)]
    pub timestamp: u64,
}

impl BreadcrumbRecord {
    /// Creates a record stamped with the current time.
    pub fn new(
        ephemeral_public_key: impl Into<String>,
        recorded_stealth_address: impl Into<String>,
        tx_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            ephemeral_public_key: ephemeral_public_key.into(),
            recorded_stealth_address: recorded_stealth_address.into(),
            tx_ref: tx_ref.into(),
            timestamp: current_timestamp(),
        }
    }

    /// Overrides the timestamp.
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Checks that every required field is present.
    pub fn validate_shape(&self) -> Result<()> {
        if self.ephemeral_public_key.trim().is_empty() {
            return Err(WraithError::InvalidBreadcrumb(
                "missing ephemeral public key".into(),
            ));
        }
        if self.recorded_stealth_address.trim().is_empty() {
            return Err(WraithError::InvalidBreadcrumb(
                "missing recorded stealth address".into(),
            ));
        }
        if self.tx_ref.trim().is_empty() {
            return Err(WraithError::InvalidBreadcrumb("missing tx reference".into()));
        }
        Ok(())
    }

    /// Decodes the ephemeral public key bytes.
    pub fn decode_breadcrumb(&self) -> Result<Breadcrumb> {
        Breadcrumb::from_memo(self.ephemeral_public_key.as_bytes())
    }

    /// Decodes the recorded stealth address.
    pub fn decode_stealth_address(&self) -> Result<StealthAddress> {
        StealthAddress::from_base58(&self.recorded_stealth_address)
    }

    /// Returns true if the record falls inside `[from, to]` (either bound optional).
    pub fn in_time_range(&self, from: Option<u64>, to: Option<u64>) -> bool {
        from.map_or(true, |from| self.timestamp >= from) && to.map_or(true, |to| self.timestamp <= to)
    }
}

/// Statistics about records held by a breadcrumb source.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BreadcrumbStats {
    /// Total number of records
    pub total_count: u64,
    /// Earliest record timestamp
    pub earliest_timestamp: Option<u64>,
    /// Latest record timestamp
    pub latest_timestamp: Option<u64>,
}

impl BreadcrumbStats {
    /// Creates empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates stats with a new record.
    pub fn add(&mut self, record: &BreadcrumbRecord) {
        self.total_count += 1;
        self.earliest_timestamp = Some(
            self.earliest_timestamp
                .map_or(record.timestamp, |t| t.min(record.timestamp)),
        );
        self.latest_timestamp = Some(
            self.latest_timestamp
                .map_or(record.timestamp, |t| t.max(record.timestamp)),
        );
    }
}

/// Returns current Unix timestamp in seconds.
fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
