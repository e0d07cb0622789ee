//! Payment discovery (recipient scan).
//!
//! Each breadcrumb costs one trial ECDH plus one stealth derivation. There
//! is no tag or index to skip candidates early; every record is tried.

use tracing::trace;

use wraith_core::error::WraithError;
use wraith_core::types::{
    BreadcrumbRecord, DhKeyPair, DhPublicKey, SeedMaterial, SpendPublicKey, StealthAddress,
};
use wraith_crypto::{
    compute_shared_secret, derive_dh_keypair, derive_stealth_keypair, spend_public_key,
    verify_stealth_address, StealthKeypair,
};

// ═══════════════════════════════════════════════════════════════════════════════
// SCAN KEYS
// ═══════════════════════════════════════════════════════════════════════════════

/// Recipient key material needed to test breadcrumbs.
///
/// Built once per scan. Holds the scan DH key pair and the spend identity,
/// never the spend seed itself.
pub struct ScanKeys {
    scan: DhKeyPair,
    spend_public_key: SpendPublicKey,
}

impl ScanKeys {
    /// Derives scan keys from the two seeds.
    pub fn new(scan_seed: &[u8; 32], spend_seed: &[u8; 32]) -> Self {
        Self {
            scan: derive_dh_keypair(scan_seed),
            spend_public_key: spend_public_key(spend_seed),
        }
    }

    /// Derives scan keys from seed material.
    pub fn from_seeds(seeds: &SeedMaterial) -> Self {
        Self::new(seeds.scan_seed(), seeds.spend_seed())
    }

    /// Returns the X25519 scan public key.
    pub fn scan_public_key(&self) -> &DhPublicKey {
        &self.scan.public
    }

    /// Returns the spend identity bound into stealth addresses.
    pub fn spend_public_key(&self) -> &SpendPublicKey {
        &self.spend_public_key
    }
}

impl std::fmt::Debug for ScanKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanKeys")
            .field("scan_public_key", &self.scan.public)
            .field("spend_public_key", &self.spend_public_key)
            .field("scan_secret", &"[REDACTED]")
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// A payment recovered from a breadcrumb.
#[derive(Debug)]
pub struct RecoveredPayment {
    /// Position of the breadcrumb in the scanned input
    pub index: usize,
    /// The matched stealth address
    pub stealth_address: StealthAddress,
    /// Stealth signing key pair (proof of control)
    pub keypair: StealthKeypair,
    /// Ephemeral key from the breadcrumb
    pub ephemeral_public_key: DhPublicKey,
    /// Transaction reference from the record
    pub tx_ref: String,
    /// Timestamp from the record
    pub timestamp: u64,
}

impl RecoveredPayment {
    /// Signs `challenge` with the stealth key, proving control of the address.
    pub fn prove_control(&self, challenge: &[u8]) -> [u8; 64] {
        self.keypair.sign(challenge)
    }
}

/// Result of scanning a single breadcrumb.
#[derive(Debug)]
pub enum ScanResult {
    /// Derived address differs from the recorded one
    NotForUs,
    /// Payment recovered
    Recovered(RecoveredPayment),
    /// Record could not be decoded or its key is unusable
    Invalid(WraithError),
}

impl ScanResult {
    /// Returns true if a payment was recovered.
    pub fn is_recovered(&self) -> bool {
        matches!(self, ScanResult::Recovered(_))
    }

    /// Returns the recovered payment if present.
    pub fn into_payment(self) -> Option<RecoveredPayment> {
        match self {
            ScanResult::Recovered(payment) => Some(payment),
            _ => None,
        }
    }
}

/// Statistics for scanning operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Total breadcrumbs scanned
    pub total_scanned: u64,
    /// Number of payments recovered
    pub matched: u64,
    /// Number of malformed records skipped
    pub skipped_invalid: u64,
    /// Duration of the scan in milliseconds
    pub duration_ms: u64,
}

impl ScanStats {
    /// Creates a new stats tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a scan result.
    pub fn record(&mut self, result: &ScanResult) {
        self.total_scanned += 1;
        match result {
            ScanResult::Recovered(_) => self.matched += 1,
            ScanResult::Invalid(_) => self.skipped_invalid += 1,
            ScanResult::NotForUs => {}
        }
    }

    /// Folds another batch's counters into this one.
    pub fn merge(&mut self, other: &ScanStats) {
        self.total_scanned += other.total_scanned;
        self.matched += other.matched;
        self.skipped_invalid += other.skipped_invalid;
    }

    /// Returns the scan rate (breadcrumbs per second).
    pub fn rate(&self) -> f64 {
        if self.duration_ms == 0 {
            0.0
        } else {
            (self.total_scanned as f64 / self.duration_ms as f64) * 1000.0
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Tests one breadcrumb record against the recipient's keys.
pub fn scan_breadcrumb(keys: &ScanKeys, record: &BreadcrumbRecord) -> ScanResult {
    scan_breadcrumb_at(keys, 0, record)
}

/// Tests one breadcrumb record, tagging a match with its input position.
///
/// Never fails as a whole: decode and curve errors become
/// [`ScanResult::Invalid`] so the caller can skip and continue.
pub fn scan_breadcrumb_at(keys: &ScanKeys, index: usize, record: &BreadcrumbRecord) -> ScanResult {
    if let Err(e) = record.validate_shape() {
        return ScanResult::Invalid(e);
    }

    let breadcrumb = match record.decode_breadcrumb() {
        Ok(b) => b,
        Err(e) => return ScanResult::Invalid(e),
    };

    let recorded = match record.decode_stealth_address() {
        Ok(a) => a,
        Err(e) => return ScanResult::Invalid(e),
    };

    let shared = match compute_shared_secret(
        &keys.scan.secret,
        breadcrumb.ephemeral_public_key().as_bytes(),
    ) {
        Ok(ss) => ss,
        Err(e) => return ScanResult::Invalid(e),
    };

    let keypair = derive_stealth_keypair(&shared, &keys.spend_public_key);
    let derived = keypair.address();
    if !verify_stealth_address(&derived, &recorded) {
        return ScanResult::NotForUs;
    }

    trace!(index, tx_ref = %record.tx_ref, "breadcrumb matched");

    ScanResult::Recovered(RecoveredPayment {
        index,
        stealth_address: derived,
        keypair,
        ephemeral_public_key: *breadcrumb.ephemeral_public_key(),
        tx_ref: record.tx_ref.clone(),
        timestamp: record.timestamp,
    })
}

/// Scans records sequentially, returning matches and counters.
///
/// The parallel, cancellable version lives in the scanner crate.
pub fn scan_breadcrumbs_sequential(
    keys: &ScanKeys,
    records: &[BreadcrumbRecord],
) -> (Vec<RecoveredPayment>, ScanStats) {
    let mut stats = ScanStats::new();
    let mut payments = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let result = scan_breadcrumb_at(keys, index, record);
        stats.record(&result);
        if let ScanResult::Recovered(payment) = result {
            payments.push(payment);
        }
    }

    (payments, stats)
}
