//! # Wraith Scanner
//!
//! Batch scanning of breadcrumb records to recover incoming payments.
//!
//! ## Features
//!
//! - **Bounded Worker Pool**: trial ECDH runs on a dedicated rayon pool
//! - **Batch Processing**: candidates are processed in configurable batches
//! - **Cancellation**: a [`CancelToken`] stops an in-flight scan between candidates
//! - **Deterministic Output**: matches are ordered by input position, never by completion
//! - **Progress Reporting**: callbacks once per batch for UI updates
//!
//! ## Example
//!
//! ```rust
//! use wraith_core::types::LedgerAddress;
//! use wraith_scanner::scan_breadcrumbs;
//! use wraith_stealth::{build_stealth_payment, PaymentRequest, StealthWallet};
//!
//! let signature = [3u8; 64];
//! let wallet = StealthWallet::from_signature(&signature).unwrap();
//! let payment = build_stealth_payment(&PaymentRequest {
//!     recipient: wallet.meta_address().clone(),
//!     amount: 1,
//!     sender: LedgerAddress::from_array([1; 32]),
//!     settlement: LedgerAddress::from_array([2; 32]),
//! })
//! .unwrap();
//!
//! let records = vec![payment.to_record("tx", 0)];
//! let report = scan_breadcrumbs(&[3u8; 32], &[3u8; 32], &records).unwrap();
//! assert_eq!(report.matched, 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task;
use tracing::{debug, info, instrument, warn};

use wraith_core::constants::{DEFAULT_SCAN_BATCH_SIZE, MAX_SCAN_BATCH_SIZE, SEED_SIZE};
use wraith_core::error::{Result, WraithError};
use wraith_core::traits::BreadcrumbSource;
use wraith_core::types::{BreadcrumbRecord, SeedMaterial};
use wraith_stealth::discovery::{scan_breadcrumb_at, RecoveredPayment, ScanKeys, ScanResult, ScanStats};
use wraith_stealth::StealthWallet;

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Scanner configuration.
#[derive(Clone, Debug)]
pub struct ScannerConfig {
    /// Worker threads in the scan pool
    pub workers: usize,
    /// Candidates per batch
    pub batch_size: usize,
    /// Stop once this many matches are found
    pub stop_after: Option<usize>,
    /// Minimum timestamp to scan from (inclusive)
    pub from_timestamp: Option<u64>,
    /// Maximum timestamp to scan to (inclusive)
    pub to_timestamp: Option<u64>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            batch_size: DEFAULT_SCAN_BATCH_SIZE,
            stop_after: None,
            from_timestamp: None,
            to_timestamp: None,
        }
    }
}

impl ScannerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the worker count (at least 1).
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Stops the scan once `n` matches have been found.
    ///
    /// Checked between batches; the first `n` matches by input position are kept.
    pub fn stop_after(mut self, n: usize) -> Self {
        self.stop_after = Some(n);
        self
    }

    /// Sets the time range filter.
    pub fn time_range(mut self, from: u64, to: u64) -> Self {
        self.from_timestamp = Some(from);
        self.to_timestamp = Some(to);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(WraithError::ConfigError("workers must be at least 1".into()));
        }
        if self.batch_size == 0 || self.batch_size > MAX_SCAN_BATCH_SIZE {
            return Err(WraithError::ConfigError(format!(
                "batch size must be between 1 and {}",
                MAX_SCAN_BATCH_SIZE
            )));
        }
        if let (Some(from), Some(to)) = (self.from_timestamp, self.to_timestamp) {
            if from > to {
                return Err(WraithError::ConfigError(
                    "time range start is after its end".into(),
                ));
            }
        }
        Ok(())
    }

    fn limit_reached(&self, matched: usize) -> bool {
        self.stop_after.map_or(false, |n| matched >= n)
    }
}

/// Returns the number of available CPU cores, at least 1.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

// ═══════════════════════════════════════════════════════════════════════════════
// CANCELLATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared flag that stops an in-flight scan.
///
/// Clones share the flag. Work already finished is kept in the report.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROGRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// Progress callback type.
pub type ProgressCallback = Box<dyn Fn(ScanProgress) + Send + Sync>;

/// Scan progress information.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Total candidates to scan
    pub total: u64,
    /// Candidates scanned so far
    pub scanned: u64,
    /// Matches found so far
    pub matched: u64,
    /// Malformed candidates skipped so far
    pub skipped_invalid: u64,
    /// Current scan rate (candidates per second)
    pub rate: f64,
    /// Estimated time remaining in seconds
    pub eta_seconds: Option<f64>,
    /// Percentage complete (0-100)
    pub percent: f64,
}

impl ScanProgress {
    /// Creates a new progress tracker.
    pub fn new(total: u64) -> Self {
        Self {
            total,
            scanned: 0,
            matched: 0,
            skipped_invalid: 0,
            rate: 0.0,
            eta_seconds: None,
            percent: 0.0,
        }
    }

    /// Updates progress from running counters.
    pub fn update(&mut self, stats: &ScanStats, elapsed_ms: u64) {
        self.scanned = stats.total_scanned;
        self.matched = stats.matched;
        self.skipped_invalid = stats.skipped_invalid;

        if elapsed_ms > 0 {
            self.rate = (self.scanned as f64 / elapsed_ms as f64) * 1000.0;
        }

        if self.total > 0 {
            self.percent = (self.scanned as f64 / self.total as f64) * 100.0;

            if self.rate > 0.0 {
                let remaining = self.total.saturating_sub(self.scanned);
                self.eta_seconds = Some(remaining as f64 / self.rate);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Outcome of a batch scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Recovered payments, ordered by input position
    pub payments: Vec<RecoveredPayment>,
    /// Number of recovered payments
    pub matched: u64,
    /// Malformed candidates skipped
    pub skipped_invalid: u64,
    /// Candidates actually tried
    pub total_scanned: u64,
    /// True if the scan stopped on a cancel request
    pub cancelled: bool,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

impl ScanReport {
    /// Returns true if the scan completed with no recovered payments.
    ///
    /// This is an ordinary outcome, not an error.
    pub fn no_match_found(&self) -> bool {
        self.payments.is_empty()
    }

    /// Returns the counters as [`ScanStats`].
    pub fn stats(&self) -> ScanStats {
        ScanStats {
            total_scanned: self.total_scanned,
            matched: self.matched,
            skipped_invalid: self.skipped_invalid,
            duration_ms: self.duration_ms,
        }
    }

    /// Returns a serializable summary.
    pub fn summary(&self) -> ScanSummary {
        ScanSummary::from(self)
    }
}

/// Scan result summary.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    /// Number of candidates scanned
    pub total_scanned: u64,
    /// Number of payments recovered
    pub matched: u64,
    /// Number of malformed candidates skipped
    pub skipped_invalid: u64,
    /// Whether the scan was cancelled
    pub cancelled: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Scan rate (candidates per second)
    pub rate: f64,
}

impl From<&ScanReport> for ScanSummary {
    fn from(report: &ScanReport) -> Self {
        Self {
            total_scanned: report.total_scanned,
            matched: report.matched,
            skipped_invalid: report.skipped_invalid,
            cancelled: report.cancelled,
            duration_ms: report.duration_ms,
            rate: report.stats().rate(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNER
// ═══════════════════════════════════════════════════════════════════════════════

/// Main scanner for recovering payments.
pub struct Scanner {
    /// Scan DH key pair and spend identity
    keys: ScanKeys,
    /// Cumulative statistics across scans
    stats: RwLock<ScanStats>,
}

impl Scanner {
    /// Creates a scanner from seed material.
    pub fn new(seeds: &SeedMaterial) -> Self {
        Self::from_keys(ScanKeys::from_seeds(seeds))
    }

    /// Creates a scanner from prepared scan keys.
    pub fn from_keys(keys: ScanKeys) -> Self {
        Self {
            keys,
            stats: RwLock::new(ScanStats::new()),
        }
    }

    /// Creates a scanner from a wallet.
    pub fn from_wallet(wallet: &StealthWallet) -> Self {
        Self::from_keys(wallet.scan_keys())
    }

    /// Returns the scan keys.
    pub fn keys(&self) -> &ScanKeys {
        &self.keys
    }

    /// Returns cumulative statistics.
    pub fn stats(&self) -> ScanStats {
        self.stats.read().clone()
    }

    /// Resets cumulative statistics.
    pub fn reset_stats(&self) {
        *self.stats.write() = ScanStats::new();
    }

    /// Scans `records` with the given configuration.
    pub fn scan(
        &self,
        records: &[BreadcrumbRecord],
        config: &ScannerConfig,
        cancel: &CancelToken,
    ) -> Result<ScanReport> {
        self.run(records, config, cancel, |_| {})
    }

    /// Scans with a progress callback invoked once per batch.
    pub fn scan_with_progress(
        &self,
        records: &[BreadcrumbRecord],
        config: &ScannerConfig,
        cancel: &CancelToken,
        progress_callback: ProgressCallback,
    ) -> Result<ScanReport> {
        self.run(records, config, cancel, |progress| progress_callback(progress.clone()))
    }

    /// Fetches records from a source and scans them.
    ///
    /// Uses the source's time-range query when the config has both bounds.
    /// On a multi-threaded runtime the scan runs under `block_in_place`, so
    /// other tasks move off this worker while it waits for the pool. A
    /// current-thread runtime is blocked for the duration of the scan; use
    /// [`Scanner::fetch`] and run [`Scanner::scan`] on `spawn_blocking` there.
    #[instrument(skip(self, source, config, cancel))]
    pub async fn scan_source(
        &self,
        source: &dyn BreadcrumbSource,
        config: &ScannerConfig,
        cancel: &CancelToken,
    ) -> Result<ScanReport> {
        if cancel.is_cancelled() {
            return Err(WraithError::ScanCancelled);
        }

        let records = Self::fetch(source, config).await?;

        match Handle::try_current().map(|h| h.runtime_flavor()) {
            Ok(RuntimeFlavor::MultiThread) => {
                task::block_in_place(|| self.scan(&records, config, cancel))
            }
            _ => self.scan(&records, config, cancel),
        }
    }

    /// Fetches the records `config` selects from a source without scanning.
    pub async fn fetch(
        source: &dyn BreadcrumbSource,
        config: &ScannerConfig,
    ) -> Result<Vec<BreadcrumbRecord>> {
        let records = match (config.from_timestamp, config.to_timestamp) {
            (Some(from), Some(to)) => source.get_by_time_range(from, to).await?,
            _ => source.all().await?,
        };
        debug!(count = records.len(), "fetched breadcrumbs");
        Ok(records)
    }

    #[instrument(skip_all, fields(candidates = records.len(), workers = config.workers))]
    fn run(
        &self,
        records: &[BreadcrumbRecord],
        config: &ScannerConfig,
        cancel: &CancelToken,
        mut on_batch: impl FnMut(&ScanProgress),
    ) -> Result<ScanReport> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("wraith-scan-{}", i))
            .build()
            .map_err(|e| WraithError::ConfigError(format!("scan pool: {}", e)))?;

        let start = Instant::now();
        let candidates: Vec<(usize, &BreadcrumbRecord)> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.in_time_range(config.from_timestamp, config.to_timestamp))
            .collect();

        info!(total = candidates.len(), "Starting scan");

        let mut stats = ScanStats::new();
        let mut progress = ScanProgress::new(candidates.len() as u64);
        let mut payments: Vec<RecoveredPayment> = Vec::new();

        for batch in candidates.chunks(config.batch_size) {
            if cancel.is_cancelled() || config.limit_reached(payments.len()) {
                break;
            }

            let results: Vec<Option<ScanResult>> = pool.install(|| {
                batch
                    .par_iter()
                    .map(|(index, record)| {
                        if cancel.is_cancelled() {
                            return None;
                        }
                        Some(scan_breadcrumb_at(&self.keys, *index, record))
                    })
                    .collect()
            });

            // Results arrive in batch order regardless of which worker finished first
            for result in results.into_iter().flatten() {
                stats.record(&result);
                match result {
                    ScanResult::Recovered(payment) => payments.push(payment),
                    ScanResult::Invalid(e) => {
                        debug!(error = %e, "skipping malformed breadcrumb");
                    }
                    ScanResult::NotForUs => {}
                }
            }

            progress.update(&stats, start.elapsed().as_millis() as u64);
            debug!(scanned = stats.total_scanned, matched = stats.matched, "batch complete");
            on_batch(&progress);
        }

        payments.sort_by_key(|p| p.index);
        if let Some(n) = config.stop_after {
            payments.truncate(n);
        }
        stats.matched = payments.len() as u64;

        stats.duration_ms = start.elapsed().as_millis() as u64;
        self.stats.write().merge(&stats);

        let report = ScanReport {
            matched: payments.len() as u64,
            payments,
            skipped_invalid: stats.skipped_invalid,
            total_scanned: stats.total_scanned,
            cancelled: cancel.is_cancelled(),
            duration_ms: stats.duration_ms,
        };

        if report.skipped_invalid > 0 {
            warn!(skipped = report.skipped_invalid, "Skipped malformed breadcrumbs");
        }
        info!(
            matched = report.matched,
            scanned = report.total_scanned,
            cancelled = report.cancelled,
            duration_ms = report.duration_ms,
            rate = format!("{:.2}/s", stats.rate()),
            "Scan complete"
        );

        Ok(report)
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("keys", &self.keys)
            .field("stats", &*self.stats.read())
            .finish()
    }
}

/// Scans `records` for payments to the holder of `scan_seed` and `spend_seed`.
///
/// Uses the default configuration: one worker per CPU core, no early stop.
pub fn scan_breadcrumbs(
    scan_seed: &[u8; SEED_SIZE],
    spend_seed: &[u8; SEED_SIZE],
    records: &[BreadcrumbRecord],
) -> Result<ScanReport> {
    Scanner::from_keys(ScanKeys::new(scan_seed, spend_seed)).scan(
        records,
        &ScannerConfig::default(),
        &CancelToken::new(),
    )
}
