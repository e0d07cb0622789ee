//! Common traits for Wraith.
//!
//! The ledger indexer is an external collaborator. This trait is the seam
//! through which already-fetched breadcrumb records reach the scanner.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::BreadcrumbRecord;

// ═══════════════════════════════════════════════════════════════════════════════
// BREADCRUMB SOURCE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for breadcrumb storage and retrieval.
///
/// Implementations might use:
/// - In-memory storage (for testing/development)
/// - A local file (single-user CLI)
/// - An indexer API that has already deduplicated and paginated ledger memos
///
/// The core never retries or times out calls made through this trait.
#[async_trait]
pub trait BreadcrumbSource: Send + Sync {
    /// Stores a new record.
    ///
    /// Returns the assigned record ID.
    async fn publish(&self, record: BreadcrumbRecord) -> Result<u64>;

    /// Returns every record in insertion order.
    async fn all(&self) -> Result<Vec<BreadcrumbRecord>>;

    /// Retrieves records within an inclusive time range, oldest first.
    async fn get_by_time_range(&self, start: u64, end: u64) -> Result<Vec<BreadcrumbRecord>>;

    /// Retrieves a specific record by ID.
    async fn get_by_id(&self, id: u64) -> Result<Option<BreadcrumbRecord>>;

    /// Returns total record count.
    async fn count(&self) -> Result<u64>;
}
