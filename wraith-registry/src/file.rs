//! File-based breadcrumb registry with persistence.
//!
//! Stores records in a single JSON file behind a small binary header.
//! Suitable for the single-user CLI where records must survive restarts.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use wraith_core::error::{Result, WraithError};
use wraith_core::traits::BreadcrumbSource;
use wraith_core::types::{BreadcrumbRecord, BreadcrumbStats};

use crate::MemoryRegistry;

/// File-based breadcrumb registry.
///
/// Uses a memory registry internally with periodic persistence to disk.
///
/// # File Format
///
/// ```text
/// magic (4 bytes): "WRTH"
/// version (1 byte): 1
/// count (8 bytes, LE): number of records
/// records (variable): JSON array of records
/// ```
pub struct FileRegistry {
    /// Path to the storage file
    path: PathBuf,
    /// In-memory storage
    memory: MemoryRegistry,
    /// Whether there are unsaved changes
    dirty: AtomicBool,
    /// Auto-save threshold (save after N writes)
    auto_save_threshold: u64,
    /// Writes since last save
    writes_since_save: AtomicU64,
    /// Held for the whole write-and-rename so saves never share the temp file
    save_lock: Mutex<()>,
}

/// File format magic bytes
const MAGIC: &[u8; 4] = b"WRTH";
/// Current file format version
const VERSION: u8 = 1;
/// Magic + version + count
const HEADER_LEN: usize = 13;

impl FileRegistry {
    /// Opens the registry at the given path.
    ///
    /// If the file exists it is loaded. Otherwise the registry starts empty
    /// and the file is created on first save.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let registry = Self {
            path: path.as_ref().to_path_buf(),
            memory: MemoryRegistry::new(),
            dirty: AtomicBool::new(false),
            auto_save_threshold: 100,
            writes_since_save: AtomicU64::new(0),
            save_lock: Mutex::new(()),
        };

        if fs::try_exists(&registry.path).await? {
            registry.load().await?;
        }

        Ok(registry)
    }

    /// Opens a file registry with a custom auto-save threshold.
    pub async fn with_auto_save(path: impl AsRef<Path>, threshold: u64) -> Result<Self> {
        let mut registry = Self::new(path).await?;
        registry.auto_save_threshold = threshold;
        Ok(registry)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<()> {
        let mut file = fs::File::open(&self.path).await.map_err(|e| {
            WraithError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to open registry file: {}", e),
            ))
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).await?;

        let records = decode_contents(&contents)?;
        info!(count = records.len(), "Loading breadcrumbs from file");

        self.memory.import(records)?;
        self.dirty.store(false, Ordering::SeqCst);
        debug!("Registry loaded successfully");

        Ok(())
    }

    /// Writes every record to disk.
    ///
    /// The file is written to a temporary sibling first and renamed over the
    /// original, so a crash never leaves a half-written registry.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn save(&self) -> Result<()> {
        let _guard = self.save_lock.lock().await;

        let records = self.memory.all_records();
        info!(count = records.len(), "Saving registry to file");

        let contents = encode_contents(&records)?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&contents).await?;
        file.sync_all().await?;

        fs::rename(&temp_path, &self.path).await?;

        self.dirty.store(false, Ordering::SeqCst);
        self.writes_since_save.store(0, Ordering::SeqCst);

        debug!("Registry saved successfully");
        Ok(())
    }

    /// Checks if there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Saves if there are unsaved changes.
    pub async fn flush(&self) -> Result<()> {
        if self.is_dirty() {
            self.save().await?;
        }
        Ok(())
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying memory registry.
    pub fn memory(&self) -> &MemoryRegistry {
        &self.memory
    }

    /// Returns statistics.
    pub fn stats(&self) -> BreadcrumbStats {
        self.memory.stats()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    async fn maybe_auto_save(&self) -> Result<()> {
        let writes = self.writes_since_save.fetch_add(1, Ordering::SeqCst);
        if writes >= self.auto_save_threshold {
            self.save().await?;
        }
        Ok(())
    }
}

impl Drop for FileRegistry {
    fn drop(&mut self) {
        // Saving needs the runtime, which may already be gone here.
        if self.is_dirty() {
            warn!(path = %self.path.display(), "FileRegistry dropped with unsaved changes");
        }
    }
}

fn encode_contents(records: &[BreadcrumbRecord]) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(records)?;

    let mut contents = Vec::with_capacity(HEADER_LEN + body.len());
    contents.extend_from_slice(MAGIC);
    contents.push(VERSION);
    contents.extend_from_slice(&(records.len() as u64).to_le_bytes());
    contents.extend_from_slice(&body);
    Ok(contents)
}

fn decode_contents(contents: &[u8]) -> Result<Vec<BreadcrumbRecord>> {
    if contents.len() < HEADER_LEN {
        return Err(WraithError::RegistryError("File too short".into()));
    }

    if &contents[0..4] != MAGIC {
        return Err(WraithError::RegistryError("Invalid magic bytes".into()));
    }

    let version = contents[4];
    if version != VERSION {
        return Err(WraithError::VersionMismatch {
            expected: VERSION,
            actual: version,
        });
    }

    let mut count_bytes = [0u8; 8];
    count_bytes.copy_from_slice(&contents[5..HEADER_LEN]);
    let count = u64::from_le_bytes(count_bytes);

    let body = &contents[HEADER_LEN..];
    if body.is_empty() {
        return if count == 0 {
            Ok(Vec::new())
        } else {
            Err(WraithError::RegistryError("Missing record body".into()))
        };
    }

    let records: Vec<BreadcrumbRecord> = serde_json::from_slice(body)?;

    if records.len() as u64 != count {
        return Err(WraithError::RegistryError(format!(
            "Header count {} disagrees with {} stored records",
            count,
            records.len()
        )));
    }

    Ok(records)
}

#[async_trait]
impl BreadcrumbSource for FileRegistry {
    async fn publish(&self, record: BreadcrumbRecord) -> Result<u64> {
        let id = self.memory.publish(record).await?;
        self.dirty.store(true, Ordering::SeqCst);
        self.maybe_auto_save().await?;
        Ok(id)
    }

    async fn all(&self) -> Result<Vec<BreadcrumbRecord>> {
        self.memory.all().await
    }

    async fn get_by_time_range(&self, start: u64, end: u64) -> Result<Vec<BreadcrumbRecord>> {
        self.memory.get_by_time_range(start, end).await
    }

    async fn get_by_id(&self, id: u64) -> Result<Option<BreadcrumbRecord>> {
        self.memory.get_by_id(id).await
    }

    async fn count(&self) -> Result<u64> {
        self.memory.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(tx_ref: &str, timestamp: u64) -> BreadcrumbRecord {
        BreadcrumbRecord::new("ephemeral", "stealth", tx_ref).with_timestamp(timestamp)
    }

    #[tokio::test]
    async fn test_new_empty_registry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.bin");

        let registry = FileRegistry::new(&path).await.unwrap();
        assert!(registry.is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.bin");

        {
            let registry = FileRegistry::new(&path).await.unwrap();
            registry.publish(record("tx-b", 2_000)).await.unwrap();
            registry.publish(record("tx-a", 1_000)).await.unwrap();
            registry.save().await.unwrap();
        }

        let registry = FileRegistry::new(&path).await.unwrap();
        assert_eq!(registry.len(), 2);

        let all = registry.all().await.unwrap();
        assert_eq!(all[0].tx_ref, "tx-b");
        assert_eq!(all[1].tx_ref, "tx-a");
        assert_eq!(all[1].id, 2);

        // Ids continue after a reload
        assert_eq!(registry.publish(record("tx-c", 3_000)).await.unwrap(), 3);
        registry.save().await.unwrap();
    }

    #[tokio::test]
    async fn test_header_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.bin");

        let registry = FileRegistry::new(&path).await.unwrap();
        registry.publish(record("tx", 0)).await.unwrap();
        registry.save().await.unwrap();

        let bytes = fs::read(&path).await.unwrap();
        assert_eq!(&bytes[0..4], b"WRTH");
        assert_eq!(bytes[4], VERSION);
        assert_eq!(u64::from_le_bytes(bytes[5..13].try_into().unwrap()), 1);
        assert_eq!(bytes[13], b'[');
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_dirty_tracking() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.bin");

        let registry = FileRegistry::new(&path).await.unwrap();
        assert!(!registry.is_dirty());

        registry.publish(record("tx", 0)).await.unwrap();
        assert!(registry.is_dirty());

        registry.save().await.unwrap();
        assert!(!registry.is_dirty());
    }

    #[tokio::test]
    async fn test_auto_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.bin");

        // Saves once the write counter reaches 2, i.e. on the third publish
        let registry = FileRegistry::with_auto_save(&path, 2).await.unwrap();
        registry.publish(record("tx-1", 0)).await.unwrap();
        registry.publish(record("tx-2", 0)).await.unwrap();
        assert!(!path.exists());

        registry.publish(record("tx-3", 0)).await.unwrap();
        assert!(!registry.is_dirty());

        let reloaded = FileRegistry::new(&path).await.unwrap();
        assert_eq!(reloaded.len(), 3);
    }

    #[tokio::test]
    async fn test_flush() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.bin");

        let registry = FileRegistry::new(&path).await.unwrap();
        registry.flush().await.unwrap();
        assert!(!path.exists());

        registry.publish(record("tx", 0)).await.unwrap();
        registry.flush().await.unwrap();
        assert!(!registry.is_dirty());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_duplicate_rejected_across_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.bin");

        {
            let registry = FileRegistry::new(&path).await.unwrap();
            registry.publish(record("tx", 0)).await.unwrap();
            registry.save().await.unwrap();
        }

        let registry = FileRegistry::new(&path).await.unwrap();
        let result = registry.publish(record("tx", 0)).await;
        assert!(matches!(result, Err(WraithError::DuplicateBreadcrumb(_))));
    }

    #[tokio::test]
    async fn test_time_range_and_stats() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.bin");

        let registry = FileRegistry::new(&path).await.unwrap();
        registry.publish(record("a", 10)).await.unwrap();
        registry.publish(record("b", 20)).await.unwrap();
        registry.publish(record("c", 30)).await.unwrap();

        assert_eq!(registry.get_by_time_range(15, 30).await.unwrap().len(), 2);
        assert_eq!(registry.count().await.unwrap(), 3);

        let stats = registry.stats();
        assert_eq!(stats.earliest_timestamp, Some(10));
        assert_eq!(stats.latest_timestamp, Some(30));
        registry.save().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_auto_saves() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.bin");

        // A zero threshold saves on every publish
        let registry = std::sync::Arc::new(FileRegistry::with_auto_save(&path, 0).await.unwrap());
        let mut handles = Vec::new();
        for i in 0..16 {
            let registry = std::sync::Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.publish(record(&format!("tx-{}", i), i)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        registry.save().await.unwrap();

        assert!(!path.with_extension("tmp").exists());
        let reloaded = FileRegistry::new(&path).await.unwrap();
        assert_eq!(reloaded.len(), 16);
    }

    #[tokio::test]
    async fn test_invalid_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.bin");

        fs::write(&path, b"invalid data").await.unwrap();
        assert!(FileRegistry::new(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_version_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.bin");

        let mut bytes = encode_contents(&[]).unwrap();
        bytes[4] = 9;
        fs::write(&path, &bytes).await.unwrap();

        let result = FileRegistry::new(&path).await;
        assert!(matches!(
            result,
            Err(WraithError::VersionMismatch { expected: 1, actual: 9 })
        ));
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let mut record = record("tx", 0);
        record.id = 1;
        let mut bytes = encode_contents(&[record]).unwrap();
        bytes[5] = 2;

        assert!(matches!(
            decode_contents(&bytes),
            Err(WraithError::RegistryError(_))
        ));
    }
}
