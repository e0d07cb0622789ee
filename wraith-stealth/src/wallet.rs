//! Recipient wallet.
//!
//! The wallet is rebuilt from a fresh signature over the domain message each
//! session. It holds seed material in memory only and never serializes it.

use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use wraith_core::error::{Result, WraithError};
use wraith_core::types::{BreadcrumbRecord, MetaAddress, SeedMaterial};
use wraith_crypto::{derive_meta_address, derive_meta_keys};

use crate::discovery::{scan_breadcrumb, RecoveredPayment, ScanKeys, ScanResult};

/// A Wraith wallet able to recognise its own stealth payments.
#[derive(ZeroizeOnDrop)]
pub struct StealthWallet {
    /// Scan and spend seeds
    seeds: SeedMaterial,
    /// Cached meta-address
    #[zeroize(skip)]
    meta_address: MetaAddress,
}

impl StealthWallet {
    /// Rebuilds the wallet from a 64-byte signature over the domain message.
    ///
    /// # Example
    ///
    /// ```rust
    /// use wraith_stealth::StealthWallet;
    ///
    /// let signature = [7u8; 64];
    /// let wallet = StealthWallet::from_signature(&signature).unwrap();
    /// assert!(wallet.meta_address().encode().starts_with("wraith:"));
    /// ```
    pub fn from_signature(signature: &[u8]) -> Result<Self> {
        Ok(Self::from_seeds(derive_meta_keys(signature)?))
    }

    /// Builds the wallet from already-split seeds.
    pub fn from_seeds(seeds: SeedMaterial) -> Self {
        let meta_address = derive_meta_address(&seeds);
        Self {
            seeds,
            meta_address,
        }
    }

    /// Returns the meta-address for publishing.
    pub fn meta_address(&self) -> &MetaAddress {
        &self.meta_address
    }

    /// Returns the seed material.
    ///
    /// # Security
    /// Handle the returned seeds carefully - do not log or expose them.
    pub fn seeds(&self) -> &SeedMaterial {
        &self.seeds
    }

    /// Derives the key material needed for scanning.
    pub fn scan_keys(&self) -> ScanKeys {
        ScanKeys::from_seeds(&self.seeds)
    }

    /// Attempts to recover a payment from one breadcrumb record.
    ///
    /// # Returns
    ///
    /// `Ok(Some(payment))` if the record is ours, `Ok(None)` if it is not,
    /// `Err(_)` if the record is malformed.
    pub fn try_recover(&self, record: &BreadcrumbRecord) -> Result<Option<RecoveredPayment>> {
        match scan_breadcrumb(&self.scan_keys(), record) {
            ScanResult::Recovered(payment) => Ok(Some(payment)),
            ScanResult::NotForUs => Ok(None),
            ScanResult::Invalid(e) => Err(e),
        }
    }

    /// Exports the public halves of the meta-keys for display.
    pub fn export_view_key(&self) -> ViewKeyExport {
        ViewKeyExport {
            meta_address: self.meta_address.encode(),
            scan_public_key: self.meta_address.scan_public_key.to_base58(),
            spend_public_key: self.meta_address.spend_public_key.to_base58(),
        }
    }
}

impl std::fmt::Debug for StealthWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StealthWallet")
            .field("meta_address", &self.meta_address.encode())
            .field("seeds", &"[REDACTED]")
            .finish()
    }
}

/// Public key material safe to show or share.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewKeyExport {
    /// Encoded meta-address
    pub meta_address: String,
    /// X25519 scan public key (base58)
    pub scan_public_key: String,
    /// Ed25519 spend public key (base58)
    pub spend_public_key: String,
}

impl ViewKeyExport {
    /// Parses the exported meta-address back.
    pub fn to_meta_address(&self) -> Result<MetaAddress> {
        let meta = MetaAddress::decode(&self.meta_address)?;
        if meta.scan_public_key.to_base58() != self.scan_public_key
            || meta.spend_public_key.to_base58() != self.spend_public_key
        {
            return Err(WraithError::InvalidMetaAddress(
                "export fields disagree with meta-address".into(),
            ));
        }
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::{build_stealth_payment, PaymentRequest};
    use wraith_core::types::LedgerAddress;

    fn fixture_signature() -> Vec<u8> {
        let mut sig = vec![0x01u8; 32];
        sig.extend_from_slice(&[0x02u8; 32]);
        sig
    }

    fn pay(meta: &MetaAddress) -> BreadcrumbRecord {
        let request = PaymentRequest {
            recipient: meta.clone(),
            amount: 10,
            sender: LedgerAddress::from_array([0xAA; 32]),
            settlement: LedgerAddress::from_array([0xBB; 32]),
        };
        build_stealth_payment(&request).unwrap().to_record("tx", 0)
    }

    #[test]
    fn test_wallet_from_signature() {
        let wallet = StealthWallet::from_signature(&fixture_signature()).unwrap();
        assert!(wallet.meta_address().validate().is_ok());
        assert_eq!(
            wallet.meta_address().scan_public_key.to_base58(),
            "2ppCEsHFnroogNMwnmeTN1kCteCWy7QaxWDGcjW9F5cA"
        );
    }

    #[test]
    fn test_wallet_rejects_bad_signature() {
        assert!(matches!(
            StealthWallet::from_signature(&[0u8; 10]),
            Err(WraithError::InvalidSeedLength { .. })
        ));
    }

    #[test]
    fn test_resigning_rebuilds_same_wallet() {
        let a = StealthWallet::from_signature(&fixture_signature()).unwrap();
        let b = StealthWallet::from_signature(&fixture_signature()).unwrap();
        assert_eq!(a.meta_address(), b.meta_address());
    }

    #[test]
    fn test_try_recover() {
        let wallet = StealthWallet::from_signature(&fixture_signature()).unwrap();
        let other = StealthWallet::from_signature(&[0x05u8; 64]).unwrap();

        let record = pay(wallet.meta_address());
        assert!(wallet.try_recover(&record).unwrap().is_some());
        assert!(other.try_recover(&record).unwrap().is_none());

        let corrupt = BreadcrumbRecord::new("0OIl", record.recorded_stealth_address.clone(), "tx");
        assert!(wallet.try_recover(&corrupt).is_err());
    }

    #[test]
    fn test_export_view_key() {
        let wallet = StealthWallet::from_signature(&fixture_signature()).unwrap();
        let export = wallet.export_view_key();

        assert_eq!(export.spend_public_key, "9hSR6S7WPtxmTojgo6GG3k4yDPecgJY292j7xrsUGWBu");
        assert_eq!(&export.to_meta_address().unwrap(), wallet.meta_address());

        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("scanPublicKey"));
    }

    #[test]
    fn test_wallet_debug_redacted() {
        let wallet = StealthWallet::from_signature(&fixture_signature()).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(debug.contains("REDACTED"));
        assert!(debug.contains("wraith:"));
    }
}
