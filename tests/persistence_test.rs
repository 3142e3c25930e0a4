use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tempfile::TempDir;

use tessera::config::StoreConfig;
use tessera::error::Result;
use tessera::persist::snapshot_file_name;
use tessera::storage::{Storage, StorageError, StorageInput, StorageOutput};
use tessera::storage::memory::MemoryStorage;
use tessera::store::CollectionStore;

#[test]
fn committed_collections_survive_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;

    {
        let store = CollectionStore::open(StoreConfig::with_data_dir(temp_dir.path()))?;
        store.source("books", "id 0", "全文检索引擎")?;
        store.source("books", "id 1", "开源工具包")?;
        store.index("books")?;
        store.source("papers", "p", "信息检索程序库")?;
        store.index("papers")?;

        // Staged but never committed.
        store.source("books", "id 2", "全文索引")?;
    }

    let store = CollectionStore::open(StoreConfig::with_data_dir(temp_dir.path()))?;
    assert_eq!(store.collections(), vec!["books", "papers"]);

    let hits = store.query("books", ["全文", "开源"], 1024)?;
    assert_eq!(hits.len(), 2);
    assert!(!hits.contains("id 2"));

    let stats = store.stats("books")?.expect("books stats");
    assert_eq!(stats.generation, 1);
    assert_eq!(stats.staged_count, 0);
    assert!(stats.committed_at.is_some());

    // Generations keep counting after a reopen.
    store.source("books", "id 3", "开源程式库")?;
    assert_eq!(store.index("books")?.generation, 2);
    Ok(())
}

#[test]
fn clear_persists_an_empty_generation() -> Result<()> {
    let temp_dir = TempDir::new()?;

    {
        let store = CollectionStore::open(StoreConfig::with_data_dir(temp_dir.path()))?;
        store.source("books", "a", "全文检索")?;
        store.index("books")?;
        store.source("books", "b", "开源工具")?;

        store.clear("books")?;
        assert_eq!(store.stats("books")?.expect("books stats").generation, 2);
    }

    let store = CollectionStore::open(StoreConfig::with_data_dir(temp_dir.path()))?;
    assert_eq!(store.collections(), vec!["books"]);
    assert!(store.query("books", ["全文", "开源"], 10)?.is_empty());

    let stats = store.stats("books")?.expect("books stats");
    assert_eq!(stats.doc_count, 0);
    assert_eq!(stats.staged_count, 0);
    assert_eq!(stats.generation, 2);
    assert!(stats.committed_at.is_none());

    // The counter does not restart after a reopen.
    store.source("books", "c", "信息检索")?;
    assert_eq!(store.index("books")?.generation, 3);
    Ok(())
}

#[test]
fn corrupt_snapshot_is_skipped_on_open() -> Result<()> {
    let temp_dir = TempDir::new()?;

    {
        let store = CollectionStore::open(StoreConfig::with_data_dir(temp_dir.path()))?;
        store.source("good", "a", "全文检索")?;
        store.index("good")?;
        store.source("bad", "b", "开源工具")?;
        store.index("bad")?;
    }

    let bad_path = temp_dir.path().join(snapshot_file_name("bad"));
    let mut bytes = std::fs::read(&bad_path)?;
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    std::fs::write(&bad_path, bytes)?;

    let store = CollectionStore::open(StoreConfig::with_data_dir(temp_dir.path()))?;
    assert_eq!(store.collections(), vec!["good"]);
    assert_eq!(store.query("good", ["全文"], 10)?.len(), 1);
    Ok(())
}

#[test]
fn failed_commit_keeps_previous_index_and_staging() -> Result<()> {
    let storage = Arc::new(MemoryStorage::new_default());
    let store = CollectionStore::with_storage(StoreConfig::default(), storage.clone())?;

    store.source("books", "a", "全文检索")?;
    store.index("books")?;

    store.source("books", "b", "开源工具")?;
    storage.set_read_only(true);
    assert!(store.index("books").is_err());

    // Old index still answers; the new document is still staged.
    assert_eq!(store.query("books", ["全文"], 10)?.len(), 1);
    assert!(store.query("books", ["开源"], 10)?.is_empty());
    let stats = store.stats("books")?.expect("books stats");
    assert_eq!(stats.generation, 1);
    assert_eq!(stats.staged_count, 1);

    storage.set_read_only(false);
    store.index("books")?;
    assert!(store.query("books", ["全文"], 10)?.is_empty());
    assert_eq!(store.query("books", ["开源"], 10)?.len(), 1);

    // A reopened store sees the last successful commit.
    let reopened = CollectionStore::with_storage(StoreConfig::default(), storage.clone())?;
    assert_eq!(reopened.document("books", "b")?.as_deref(), Some("开源工具"));
    assert!(storage.file_exists(&snapshot_file_name("books")));
    Ok(())
}

#[test]
fn failed_clear_changes_nothing() -> Result<()> {
    let storage = Arc::new(MemoryStorage::new_default());
    let store = CollectionStore::with_storage(StoreConfig::default(), storage.clone())?;

    store.source("books", "a", "全文检索")?;
    store.index("books")?;

    storage.set_read_only(true);
    assert!(store.clear("books").is_err());
    assert_eq!(store.query("books", ["全文"], 10)?.len(), 1);
    Ok(())
}

/// Memory storage whose directory sync can be made to fail.
#[derive(Debug, Default)]
struct FailingSyncStorage {
    inner: MemoryStorage,
    fail_sync: AtomicBool,
}

impl FailingSyncStorage {
    fn set_fail_sync(&self, fail: bool) {
        self.fail_sync.store(fail, Ordering::SeqCst);
    }
}

impl Storage for FailingSyncStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        self.inner.open_input(name)
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        self.inner.create_output(name)
    }

    fn file_exists(&self, name: &str) -> bool {
        self.inner.file_exists(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.inner.delete_file(name)
    }

    fn list_files(&self) -> Result<Vec<String>> {
        self.inner.list_files()
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.inner.rename_file(old_name, new_name)
    }

    fn sync(&self) -> Result<()> {
        if self.fail_sync.load(Ordering::SeqCst) {
            return Err(StorageError::IoError("sync failed".to_string()).into());
        }
        self.inner.sync()
    }
}

#[test]
fn commit_that_fails_to_sync_is_not_persisted() -> Result<()> {
    let storage = Arc::new(FailingSyncStorage::default());
    let store = CollectionStore::with_storage(StoreConfig::default(), storage.clone())?;

    store.source("books", "a", "全文检索")?;
    store.index("books")?;

    store.source("books", "b", "开源工具")?;
    storage.set_fail_sync(true);
    assert!(store.index("books").is_err());

    assert_eq!(store.document("books", "a")?.as_deref(), Some("全文检索"));
    assert!(store.document("books", "b")?.is_none());
    assert_eq!(store.stats("books")?.expect("books stats").staged_count, 1);
    assert_eq!(storage.list_files()?, vec![snapshot_file_name("books")]);

    // What a restart sees matches what the failed commit reported.
    storage.set_fail_sync(false);
    let reopened = CollectionStore::with_storage(StoreConfig::default(), storage.clone())?;
    assert_eq!(reopened.document("books", "a")?.as_deref(), Some("全文检索"));
    assert!(reopened.document("books", "b")?.is_none());
    assert_eq!(reopened.stats("books")?.expect("books stats").generation, 1);
    Ok(())
}
