//! The collection store: lifecycle operations over named collections.
//!
//! [`CollectionStore`] is the entry point of the crate. It maps collection
//! names to [`Collection`]s, creating them on first use, and routes the
//! clear, source, index and query operations to them.
//!
//! # Examples
//!
//! ```
//! use tessera::store::CollectionStore;
//!
//! # fn main() -> tessera::error::Result<()> {
//! let store = CollectionStore::in_memory();
//! store.source("books", "id 0", "全文检索引擎")?;
//! store.source("books", "id 1", "开源工具包")?;
//! store.index("books")?;
//!
//! let hits = store.query("books", ["全文", "开源"], 1024)?;
//! assert_eq!(hits.len(), 2);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, info};
use parking_lot::RwLock;

use crate::analysis::tokenizer::BigramTokenizer;
use crate::collection::{Collection, CollectionStats, CommitSummary};
use crate::config::StoreConfig;
use crate::error::{Result, TesseraError};
use crate::index::builder::SnapshotBuilder;
use crate::ingest::decode_text;
use crate::persist::SnapshotStore;
use crate::query::{QueryEvaluator, QueryHits, QueryRequest};
use crate::storage::{Storage, StorageFactory};

/// Owns every collection and the shared analysis and persistence machinery.
#[derive(Debug)]
pub struct CollectionStore {
    config: StoreConfig,
    tokenizer: BigramTokenizer,
    collections: RwLock<AHashMap<String, Arc<Collection>>>,
    snapshots: Option<SnapshotStore>,
}

impl CollectionStore {
    /// A store that keeps everything in memory.
    pub fn in_memory() -> Self {
        CollectionStore {
            config: StoreConfig::default(),
            tokenizer: BigramTokenizer::new(),
            collections: RwLock::new(AHashMap::new()),
            snapshots: None,
        }
    }

    /// Open a store, loading any persisted collections.
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;

        let snapshots = match &config.storage {
            Some(storage_config) => Some(SnapshotStore::new(StorageFactory::create(
                storage_config.clone(),
            )?)),
            None => None,
        };
        Self::build(config, snapshots)
    }

    /// Open a store persisting to an already constructed storage backend.
    ///
    /// `config.storage` is ignored.
    pub fn with_storage(config: StoreConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        config.validate()?;
        Self::build(config, Some(SnapshotStore::new(storage)))
    }

    fn build(config: StoreConfig, snapshots: Option<SnapshotStore>) -> Result<Self> {
        let store = CollectionStore {
            config,
            tokenizer: BigramTokenizer::new(),
            collections: RwLock::new(AHashMap::new()),
            snapshots,
        };
        store.load_persisted()?;
        Ok(store)
    }

    fn load_persisted(&self) -> Result<()> {
        let Some(snapshots) = &self.snapshots else {
            return Ok(());
        };

        let builder = self.builder();
        let mut collections = self.collections.write();
        for persisted in snapshots.load_all()? {
            let mut snapshot = builder.build(&persisted.documents, persisted.generation)?;
            snapshot.committed_at = persisted.committed_at;
            info!(
                "loaded collection '{}' generation {} ({} documents)",
                persisted.collection,
                snapshot.generation(),
                snapshot.doc_count()
            );
            let collection = Collection::with_snapshot(persisted.collection.clone(), snapshot);
            collections.insert(persisted.collection, Arc::new(collection));
        }
        Ok(())
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn builder(&self) -> SnapshotBuilder<'_> {
        SnapshotBuilder::new(&self.tokenizer)
            .with_parallel_threshold(self.config.parallel_commit_threshold)
    }

    fn validate_name(collection: &str) -> Result<()> {
        if collection.is_empty() {
            return Err(TesseraError::invalid_argument(
                "collection name must not be empty",
            ));
        }
        Ok(())
    }

    fn existing(&self, collection: &str) -> Result<Option<Arc<Collection>>> {
        Self::validate_name(collection)?;
        Ok(self.collections.read().get(collection).cloned())
    }

    fn get_or_create(&self, collection: &str) -> Result<Arc<Collection>> {
        if let Some(existing) = self.existing(collection)? {
            return Ok(existing);
        }

        let mut collections = self.collections.write();
        let entry = collections
            .entry(collection.to_string())
            .or_insert_with(|| {
                debug!("created collection '{collection}'");
                Arc::new(Collection::new(collection))
            });
        Ok(Arc::clone(entry))
    }

    /// Discard all staged and committed documents of `collection`.
    pub fn clear(&self, collection: &str) -> Result<()> {
        self.get_or_create(collection)?
            .clear(self.snapshots.as_ref())
    }

    /// Stage a document for the next commit of `collection`.
    ///
    /// Staging the same id twice keeps the later text. Nothing becomes
    /// searchable until [`index`](Self::index) is called.
    pub fn source(&self, collection: &str, doc_id: &str, text: &str) -> Result<()> {
        self.get_or_create(collection)?
            .stage(doc_id.to_string(), text.to_string());
        Ok(())
    }

    /// Stage a document supplied as raw bytes, rejecting invalid UTF-8.
    pub fn source_bytes(&self, collection: &str, doc_id: &str, text: &[u8]) -> Result<()> {
        Self::validate_name(collection)?;
        let text = decode_text(text)?;
        self.get_or_create(collection)?
            .stage(doc_id.to_string(), text);
        Ok(())
    }

    /// Replace the committed index of `collection` with one built from
    /// everything staged since the previous commit.
    pub fn index(&self, collection: &str) -> Result<CommitSummary> {
        self.get_or_create(collection)?
            .commit(&self.builder(), self.snapshots.as_ref())
    }

    /// Document ids of `collection` whose text contains any of `words`.
    ///
    /// At most `limit` ids are returned (further capped by the configured
    /// `max_query_limit`); truncation keeps the smallest ids. Unknown
    /// collections yield no results.
    pub fn query<I, S>(&self, collection: &str, words: I, limit: usize) -> Result<BTreeSet<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.search(collection, words, limit)?.into_set())
    }

    /// Like [`query`](Self::query), with the untruncated hit count and the
    /// generation that answered.
    pub fn search<I, S>(&self, collection: &str, words: I, limit: usize) -> Result<QueryHits>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let request = QueryRequest::new(words, self.config.effective_limit(limit));
        let Some(collection) = self.existing(collection)? else {
            return Ok(QueryHits {
                doc_ids: Vec::new(),
                total_hits: 0,
                generation: 0,
            });
        };

        let snapshot = collection.snapshot();
        let hits = QueryEvaluator::new(&self.tokenizer).evaluate(&snapshot, &request)?;
        debug!(
            "query on '{}' with {} words: {} of {} hits",
            collection.name(),
            request.words.len(),
            hits.doc_ids.len(),
            hits.total_hits
        );
        Ok(hits)
    }

    /// Statistics of `collection`, or `None` if it was never used.
    pub fn stats(&self, collection: &str) -> Result<Option<CollectionStats>> {
        Ok(self.existing(collection)?.map(|c| c.stats()))
    }

    /// Names of all known collections, sorted.
    pub fn collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Committed text of one document.
    pub fn document(&self, collection: &str, doc_id: &str) -> Result<Option<String>> {
        Ok(self
            .existing(collection)?
            .and_then(|c| c.snapshot().document(doc_id).map(str::to_string)))
    }
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageConfig;

    #[test]
    fn test_empty_collection_name_rejected() {
        let store = CollectionStore::in_memory();
        for result in [
            store.clear(""),
            store.source("", "a", "x"),
            store.index("").map(|_| ()),
            store.query("", ["x"], 10).map(|_| ()),
            store.stats("").map(|_| ()),
        ] {
            assert!(matches!(result, Err(TesseraError::InvalidArgument(_))));
        }
        assert!(store.collections().is_empty());
    }

    #[test]
    fn test_query_unknown_collection() {
        let store = CollectionStore::in_memory();
        assert!(store.query("nothing", ["全文"], 10).unwrap().is_empty());
        assert!(store.stats("nothing").unwrap().is_none());
        assert!(store.collections().is_empty());
    }

    #[test]
    fn test_collections_are_isolated() {
        let store = CollectionStore::in_memory();
        store.source("a", "1", "全文检索").unwrap();
        store.source("b", "1", "开源工具").unwrap();
        store.index("a").unwrap();
        store.index("b").unwrap();

        assert_eq!(store.query("a", ["开源"], 10).unwrap().len(), 0);
        assert_eq!(store.query("b", ["开源"], 10).unwrap().len(), 1);
        assert_eq!(store.collections(), vec!["a", "b"]);
        assert_eq!(store.document("a", "1").unwrap().as_deref(), Some("全文检索"));
    }

    #[test]
    fn test_source_bytes_rejects_invalid_utf8() {
        let store = CollectionStore::in_memory();
        let err = store.source_bytes("c", "1", &[0x61, 0xff]).unwrap_err();
        assert!(matches!(err, TesseraError::Encoding(_)));

        store.source_bytes("c", "2", "全文".as_bytes()).unwrap();
        assert_eq!(store.stats("c").unwrap().unwrap().staged_count, 1);
    }

    #[test]
    fn test_max_query_limit_caps_results() {
        let config = StoreConfig {
            max_query_limit: Some(2),
            ..Default::default()
        };
        let store = CollectionStore::open(config).unwrap();
        for id in ["a", "b", "c"] {
            store.source("c", id, "全文").unwrap();
        }
        store.index("c").unwrap();

        let hits = store.search("c", ["全文"], 100).unwrap();
        assert_eq!(hits.doc_ids, vec!["a", "b"]);
        assert_eq!(hits.total_hits, 3);
    }

    #[test]
    fn test_open_memory_storage_persists_commits() {
        let config = StoreConfig {
            storage: Some(StorageConfig::default()),
            ..Default::default()
        };
        let store = CollectionStore::open(config).unwrap();
        store.source("c", "1", "全文").unwrap();
        let summary = store.index("c").unwrap();
        assert_eq!(summary.generation, 1);
        assert_eq!(store.query("c", ["全"], 10).unwrap().len(), 1);
    }
}
