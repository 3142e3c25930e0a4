//! Immutable committed index of one collection.

use ahash::AHashMap;
use chrono::{DateTime, Utc};

use crate::index::posting::{DocOrd, PostingList, union_all};

/// A committed, read-only inverted index together with the retained text of
/// every document it was built from.
///
/// A snapshot is never mutated after construction. Commits build a fresh
/// snapshot and swap it in wholesale, so readers holding an `Arc` to an old
/// snapshot keep a consistent view: postings and texts always come from the
/// same staging snapshot.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    /// Commit counter of the owning collection.
    pub(crate) generation: u64,

    /// When this snapshot was committed; `None` for the initial empty index.
    pub(crate) committed_at: Option<DateTime<Utc>>,

    /// Document ids in ascending order; a document's ordinal is its position.
    pub(crate) doc_ids: Vec<String>,

    /// Retained raw text, parallel to `doc_ids`.
    pub(crate) texts: Vec<String>,

    /// Term dictionary.
    pub(crate) terms: AHashMap<String, PostingList>,
}

impl IndexSnapshot {
    /// An index with no documents.
    pub fn empty(generation: u64) -> Self {
        IndexSnapshot {
            generation,
            committed_at: None,
            doc_ids: Vec::new(),
            texts: Vec::new(),
            terms: AHashMap::new(),
        }
    }

    /// Commit counter this snapshot was produced at.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Commit timestamp, if this snapshot came from a commit.
    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        self.committed_at
    }

    /// Number of documents.
    pub fn doc_count(&self) -> usize {
        self.doc_ids.len()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Check if the snapshot holds no documents.
    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Posting list of a term.
    pub fn postings(&self, term: &str) -> Option<&PostingList> {
        self.terms.get(term)
    }

    /// Union of the posting lists of every term that contains `scalar`.
    ///
    /// Every occurrence of a scalar inside a document of two or more scalars
    /// is part of at least one bigram, and one-scalar documents index the
    /// scalar itself, so this is exactly the set of documents containing it.
    pub fn postings_containing(&self, scalar: char) -> PostingList {
        union_all(
            self.terms
                .iter()
                .filter(|(term, _)| term.contains(scalar))
                .map(|(_, postings)| postings),
        )
    }

    /// Document id of an ordinal.
    pub fn doc_id(&self, doc_ord: DocOrd) -> Option<&str> {
        self.doc_ids.get(doc_ord as usize).map(String::as_str)
    }

    /// Retained text of an ordinal.
    pub fn text(&self, doc_ord: DocOrd) -> Option<&str> {
        self.texts.get(doc_ord as usize).map(String::as_str)
    }

    /// Ordinal of a document id.
    pub fn ordinal(&self, doc_id: &str) -> Option<DocOrd> {
        self.doc_ids
            .binary_search_by(|id| id.as_str().cmp(doc_id))
            .ok()
            .map(|pos| pos as DocOrd)
    }

    /// Retained text of a document id.
    pub fn document(&self, doc_id: &str) -> Option<&str> {
        self.ordinal(doc_id).and_then(|ord| self.text(ord))
    }

    /// Iterate `(doc_id, text)` pairs in ascending id order.
    pub fn documents(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.doc_ids
            .iter()
            .zip(self.texts.iter())
            .map(|(id, text)| (id.as_str(), text.as_str()))
    }
}

impl Default for IndexSnapshot {
    fn default() -> Self {
        Self::empty(0)
    }
}
