//! Collection module.
//!
//! A [`Collection`] owns one staging buffer and one committed
//! [`IndexSnapshot`]. Staging is mutated in place under a lock; the
//! committed snapshot is only ever replaced, never mutated, so queries read
//! it without blocking on commits.

pub mod staging;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::builder::SnapshotBuilder;
use crate::index::snapshot::IndexSnapshot;
use crate::persist::SnapshotStore;

pub use staging::StagingBuffer;

/// Statistics about one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Collection name.
    pub name: String,
    /// Documents in the committed index.
    pub doc_count: usize,
    /// Distinct terms in the committed index.
    pub term_count: usize,
    /// Documents staged since the last commit.
    pub staged_count: usize,
    /// Commit counter.
    pub generation: u64,
    /// Timestamp of the committed index, if any commit produced it.
    pub committed_at: Option<DateTime<Utc>>,
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    /// Collection name.
    pub collection: String,
    /// Documents in the new index.
    pub doc_count: usize,
    /// Distinct terms in the new index.
    pub term_count: usize,
    /// Generation of the new index.
    pub generation: u64,
    /// Time spent building and publishing the index.
    pub elapsed: Duration,
}

/// A named, isolated set of staged and committed documents.
#[derive(Debug)]
pub struct Collection {
    name: String,

    /// Documents waiting for the next commit.
    staging: Mutex<StagingBuffer>,

    /// The committed index; replaced wholesale on commit and clear.
    committed: RwLock<Arc<IndexSnapshot>>,

    /// Serializes commit and clear so snapshots publish in generation order.
    commit_lock: Mutex<()>,
}

impl Collection {
    /// Create an empty collection.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self::with_snapshot(name, IndexSnapshot::empty(0))
    }

    /// Create a collection whose committed index is `snapshot`.
    pub fn with_snapshot<S: Into<String>>(name: S, snapshot: IndexSnapshot) -> Self {
        Collection {
            name: name.into(),
            staging: Mutex::new(StagingBuffer::new()),
            committed: RwLock::new(Arc::new(snapshot)),
            commit_lock: Mutex::new(()),
        }
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stage a document, overwriting any staged text with the same id.
    pub fn stage(&self, doc_id: String, text: String) {
        debug!("staging '{}' in collection '{}'", doc_id, self.name);
        if self.staging.lock().stage(doc_id, text).is_some() {
            debug!("replaced previously staged text in collection '{}'", self.name);
        }
    }

    /// Number of staged documents.
    pub fn staged_count(&self) -> usize {
        self.staging.lock().len()
    }

    /// The current committed index.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.committed.read().clone()
    }

    fn publish(&self, snapshot: IndexSnapshot) -> Arc<IndexSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.committed.write() = Arc::clone(&snapshot);
        snapshot
    }

    /// Commit everything staged into a brand new index.
    ///
    /// The new index is built from the drained staging buffer only; it does
    /// not merge with the previous index. If building or persisting fails,
    /// the previous index stays visible and the drained documents go back to
    /// staging (documents staged in the meantime are newer and win).
    pub fn commit(
        &self,
        builder: &SnapshotBuilder<'_>,
        persister: Option<&SnapshotStore>,
    ) -> Result<CommitSummary> {
        let _commit = self.commit_lock.lock();
        let start = Instant::now();

        let documents = self.staging.lock().take();
        let generation = self.snapshot().generation() + 1;

        let built = builder.build(&documents, generation).and_then(|snapshot| {
            if let Some(persister) = persister {
                persister.save(&self.name, &snapshot)?;
            }
            Ok(snapshot)
        });

        let snapshot = match built {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.staging.lock().restore(documents);
                return Err(e);
            }
        };

        let snapshot = self.publish(snapshot);
        let summary = CommitSummary {
            collection: self.name.clone(),
            doc_count: snapshot.doc_count(),
            term_count: snapshot.term_count(),
            generation,
            elapsed: start.elapsed(),
        };

        info!(
            "committed collection '{}' generation {}: {} documents, {} terms in {:?}",
            self.name, summary.generation, summary.doc_count, summary.term_count, summary.elapsed
        );
        Ok(summary)
    }

    /// Drop both staged and committed documents.
    ///
    /// The cleared state is an empty index at the next generation. It is
    /// persisted first; if that fails nothing in memory changes.
    pub fn clear(&self, persister: Option<&SnapshotStore>) -> Result<()> {
        let _commit = self.commit_lock.lock();

        let cleared = IndexSnapshot::empty(self.snapshot().generation() + 1);
        if let Some(persister) = persister {
            persister.save(&self.name, &cleared)?;
        }

        self.staging.lock().clear();
        self.publish(cleared);

        info!("cleared collection '{}'", self.name);
        Ok(())
    }

    /// Current statistics.
    pub fn stats(&self) -> CollectionStats {
        let snapshot = self.snapshot();
        CollectionStats {
            name: self.name.clone(),
            doc_count: snapshot.doc_count(),
            term_count: snapshot.term_count(),
            staged_count: self.staged_count(),
            generation: snapshot.generation(),
            committed_at: snapshot.committed_at(),
        }
    }
}
