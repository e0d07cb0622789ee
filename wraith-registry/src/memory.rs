//! In-memory breadcrumb registry.
//!
//! Fast, thread-safe storage using DashMap for concurrent access.
//! Suitable for development, testing, and as the working set of the file
//! registry.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use wraith_core::error::{Result, WraithError};
use wraith_core::traits::BreadcrumbSource;
use wraith_core::types::{BreadcrumbRecord, BreadcrumbStats};

/// In-memory breadcrumb registry.
///
/// Records keep the ids they were assigned on publish, and ids grow
/// monotonically, so ordering by id is insertion order.
pub struct MemoryRegistry {
    /// Records by ID
    records: DashMap<u64, BreadcrumbRecord>,
    /// Transaction reference to record ID
    tx_ref_index: DashMap<String, u64>,
    /// Next ID to assign
    next_id: AtomicU64,
    /// Running statistics
    stats: RwLock<BreadcrumbStats>,
}

impl MemoryRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            tx_ref_index: DashMap::new(),
            next_id: AtomicU64::new(1),
            stats: RwLock::new(BreadcrumbStats::new()),
        }
    }

    /// Creates a registry with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: DashMap::with_capacity(capacity),
            tx_ref_index: DashMap::with_capacity(capacity),
            next_id: AtomicU64::new(1),
            stats: RwLock::new(BreadcrumbStats::new()),
        }
    }

    /// Returns current statistics.
    pub fn stats(&self) -> BreadcrumbStats {
        self.stats.read().clone()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clears all records and resets ids.
    pub fn clear(&self) {
        self.records.clear();
        self.tx_ref_index.clear();
        self.next_id.store(1, Ordering::SeqCst);
        *self.stats.write() = BreadcrumbStats::new();
    }

    /// Returns every record ordered by id.
    pub fn all_records(&self) -> Vec<BreadcrumbRecord> {
        let mut records: Vec<BreadcrumbRecord> =
            self.records.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by_key(|r| r.id);
        records
    }

    /// Imports previously stored records, keeping their ids.
    ///
    /// Records whose tx reference is already present are skipped.
    /// Returns the number of records imported.
    pub fn import(&self, records: Vec<BreadcrumbRecord>) -> Result<usize> {
        let mut imported = 0;

        for record in records {
            record.validate_shape()?;
            if record.id == 0 {
                return Err(WraithError::RegistryError(format!(
                    "stored record for tx {} has no id",
                    record.tx_ref
                )));
            }
            if self.records.contains_key(&record.id) {
                return Err(WraithError::RegistryError(format!(
                    "duplicate stored id {}",
                    record.id
                )));
            }

            match self.tx_ref_index.entry(normalize_tx_ref(&record.tx_ref)) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    slot.insert(record.id);
                }
            }

            self.next_id.fetch_max(record.id + 1, Ordering::SeqCst);
            self.stats.write().add(&record);
            self.records.insert(record.id, record);
            imported += 1;
        }

        debug!(imported, "Imported breadcrumb records");
        Ok(imported)
    }

    /// Looks up a record by its transaction reference.
    pub fn get_by_tx_ref(&self, tx_ref: &str) -> Option<BreadcrumbRecord> {
        let id = *self.tx_ref_index.get(&normalize_tx_ref(tx_ref))?;
        self.records.get(&id).map(|entry| entry.value().clone())
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Ledger signatures are case-sensitive base58, so only whitespace is stripped.
fn normalize_tx_ref(tx_ref: &str) -> String {
    tx_ref.trim().to_string()
}

#[async_trait]
impl BreadcrumbSource for MemoryRegistry {
    #[instrument(skip(self, record), fields(tx_ref = %record.tx_ref))]
    async fn publish(&self, mut record: BreadcrumbRecord) -> Result<u64> {
        record.validate_shape()?;

        let tx_ref = normalize_tx_ref(&record.tx_ref);
        let id = match self.tx_ref_index.entry(tx_ref.clone()) {
            Entry::Occupied(_) => return Err(WraithError::DuplicateBreadcrumb(tx_ref)),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                slot.insert(id);
                id
            }
        };

        record.id = id;
        self.stats.write().add(&record);
        self.records.insert(id, record);

        debug!(id, "Published breadcrumb");
        Ok(id)
    }

    async fn all(&self) -> Result<Vec<BreadcrumbRecord>> {
        Ok(self.all_records())
    }

    async fn get_by_time_range(&self, start: u64, end: u64) -> Result<Vec<BreadcrumbRecord>> {
        let mut results: Vec<BreadcrumbRecord> = self
            .records
            .iter()
            .filter(|entry| {
                let ts = entry.value().timestamp;
                ts >= start && ts <= end
            })
            .map(|entry| entry.value().clone())
            .collect();

        results.sort_by_key(|r| (r.timestamp, r.id));
        Ok(results)
    }

    async fn get_by_id(&self, id: u64) -> Result<Option<BreadcrumbRecord>> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(tx_ref: &str, timestamp: u64) -> BreadcrumbRecord {
        BreadcrumbRecord::new("ephemeral", "stealth", tx_ref).with_timestamp(timestamp)
    }

    #[tokio::test]
    async fn test_publish_and_get() {
        let registry = MemoryRegistry::new();

        let id = registry.publish(record("tx-1", 1_000)).await.unwrap();
        assert_eq!(id, 1);

        let stored = registry.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.id, 1);
        assert_eq!(stored.tx_ref, "tx-1");
        assert_eq!(stored.ephemeral_public_key, "ephemeral");
    }

    #[tokio::test]
    async fn test_sequential_ids() {
        let registry = MemoryRegistry::new();

        for i in 0..5 {
            let id = registry.publish(record(&format!("tx-{}", i), 0)).await.unwrap();
            assert_eq!(id, i + 1);
        }
        assert_eq!(registry.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_all_preserves_insertion_order() {
        let registry = MemoryRegistry::new();
        registry.publish(record("c", 3_000)).await.unwrap();
        registry.publish(record("a", 1_000)).await.unwrap();
        registry.publish(record("b", 2_000)).await.unwrap();

        let tx_refs: Vec<String> = registry
            .all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.tx_ref)
            .collect();
        assert_eq!(tx_refs, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_duplicate_tx_ref_rejected() {
        let registry = MemoryRegistry::new();
        registry.publish(record("tx-1", 0)).await.unwrap();

        let result = registry.publish(record("tx-1", 5)).await;
        assert!(matches!(result, Err(WraithError::DuplicateBreadcrumb(_))));

        let padded = registry.publish(record("  tx-1 ", 5)).await;
        assert!(matches!(padded, Err(WraithError::DuplicateBreadcrumb(_))));

        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_tx_ref_case_sensitive() {
        let registry = MemoryRegistry::new();
        registry.publish(record("AbC", 0)).await.unwrap();
        registry.publish(record("abc", 0)).await.unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let registry = MemoryRegistry::new();
        let result = registry.publish(BreadcrumbRecord::new("", "stealth", "tx")).await;
        assert!(matches!(result, Err(WraithError::InvalidBreadcrumb(_))));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_keys_stored_verbatim() {
        let registry = MemoryRegistry::new();
        let id = registry
            .publish(BreadcrumbRecord::new("0OIl", "not-base58!", "tx"))
            .await
            .unwrap();

        let stored = registry.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.ephemeral_public_key, "0OIl");
    }

    #[tokio::test]
    async fn test_get_by_time_range() {
        let registry = MemoryRegistry::new();
        registry.publish(record("late", 3_000)).await.unwrap();
        registry.publish(record("early", 1_000)).await.unwrap();
        registry.publish(record("mid", 2_000)).await.unwrap();

        let range = registry.get_by_time_range(1_000, 2_000).await.unwrap();
        let tx_refs: Vec<&str> = range.iter().map(|r| r.tx_ref.as_str()).collect();
        assert_eq!(tx_refs, vec!["early", "mid"]);

        assert!(registry.get_by_time_range(4_000, 5_000).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_tx_ref() {
        let registry = MemoryRegistry::new();
        let id = registry.publish(record("sig-xyz", 0)).await.unwrap();

        assert_eq!(registry.get_by_tx_ref("sig-xyz").unwrap().id, id);
        assert!(registry.get_by_tx_ref("missing").is_none());
    }

    #[tokio::test]
    async fn test_stats() {
        let registry = MemoryRegistry::new();
        registry.publish(record("a", 200)).await.unwrap();
        registry.publish(record("b", 100)).await.unwrap();

        let stats = registry.stats();
        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.earliest_timestamp, Some(100));
        assert_eq!(stats.latest_timestamp, Some(200));
    }

    #[tokio::test]
    async fn test_import_keeps_ids() {
        let source = MemoryRegistry::new();
        source.publish(record("a", 1)).await.unwrap();
        source.publish(record("b", 2)).await.unwrap();

        let target = MemoryRegistry::new();
        assert_eq!(target.import(source.all_records()).unwrap(), 2);

        let next = target.publish(record("c", 3)).await.unwrap();
        assert_eq!(next, 3);
        assert_eq!(target.get_by_id(2).await.unwrap().unwrap().tx_ref, "b");
    }

    #[tokio::test]
    async fn test_import_skips_known_tx_refs() {
        let registry = MemoryRegistry::new();
        registry.publish(record("a", 1)).await.unwrap();

        let mut incoming = record("a", 1);
        incoming.id = 7;
        assert_eq!(registry.import(vec![incoming]).unwrap(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let registry = MemoryRegistry::new();
        registry.publish(record("a", 1)).await.unwrap();

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.stats().total_count, 0);
        assert_eq!(registry.publish(record("a", 1)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_publish() {
        let registry = Arc::new(MemoryRegistry::new());
        let mut handles = Vec::new();

        for i in 0..32 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.publish(record(&format!("tx-{}", i), i)).await
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=32).collect::<Vec<u64>>());
    }
}
