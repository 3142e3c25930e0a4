//! Query evaluation against a committed index.
//!
//! A query is a set of words. A document matches a word when its retained
//! text contains the word as a contiguous substring; it matches the query
//! when it matches any word. Posting lists only narrow the candidates, the
//! substring check over the retained text decides.

use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;
use crate::index::posting::{DocOrd, PostingList, intersect_all};
use crate::index::snapshot::IndexSnapshot;

/// Default result bound used by the command line.
pub const DEFAULT_QUERY_LIMIT: usize = 1024;

/// A set of words and a result bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Words to look for. Duplicates collapse; empty words are ignored.
    pub words: BTreeSet<String>,
    /// Maximum number of document ids returned.
    pub limit: usize,
}

impl QueryRequest {
    /// Create a request from any collection of words.
    pub fn new<I, S>(words: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        QueryRequest {
            words: words.into_iter().map(|w| w.as_ref().to_string()).collect(),
            limit,
        }
    }
}

/// Outcome of evaluating a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryHits {
    /// Matching document ids, ascending, at most `limit` of them.
    pub doc_ids: Vec<String>,
    /// Number of matching documents before truncation.
    pub total_hits: usize,
    /// Generation of the snapshot the query ran against.
    pub generation: u64,
}

impl QueryHits {
    /// Check if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Matching ids as a set.
    pub fn into_set(self) -> BTreeSet<String> {
        self.doc_ids.into_iter().collect()
    }
}

/// Evaluates queries with the tokenizer the index was built with.
pub struct QueryEvaluator<'a> {
    tokenizer: &'a dyn Tokenizer,
}

impl<'a> QueryEvaluator<'a> {
    /// Create an evaluator.
    pub fn new(tokenizer: &'a dyn Tokenizer) -> Self {
        QueryEvaluator { tokenizer }
    }

    /// Candidate ordinals for one non-empty word.
    fn candidates(&self, snapshot: &IndexSnapshot, word: &str) -> Result<PostingList> {
        let mut scalars = word.chars();
        if let (Some(scalar), None) = (scalars.next(), scalars.next()) {
            // A lone scalar is indexed inside bigrams, not as its own term.
            return Ok(snapshot.postings_containing(scalar));
        }

        let terms = self.tokenizer.terms(word)?;
        let mut lists = Vec::with_capacity(terms.len());
        for term in &terms {
            match snapshot.postings(term) {
                Some(postings) => lists.push(postings),
                None => return Ok(PostingList::new()),
            }
        }
        Ok(intersect_all(lists))
    }

    /// Ordinals of every document matching `word`.
    fn matches(&self, snapshot: &IndexSnapshot, word: &str) -> Result<Vec<DocOrd>> {
        let candidates = self.candidates(snapshot, word)?;
        Ok(candidates
            .iter()
            .filter(|&ord| snapshot.text(ord).is_some_and(|text| text.contains(word)))
            .collect())
    }

    /// Evaluate `request` against `snapshot`.
    ///
    /// Results are the union of per-word matches. Ordinals follow ascending
    /// document id, so truncation keeps the smallest ids and repeated
    /// queries against the same snapshot return the same subset.
    pub fn evaluate(&self, snapshot: &IndexSnapshot, request: &QueryRequest) -> Result<QueryHits> {
        let mut matched: BTreeSet<DocOrd> = BTreeSet::new();
        for word in request.words.iter().filter(|w| !w.is_empty()) {
            let hits = self.matches(snapshot, word)?;
            debug!("word {:?} matched {} documents", word, hits.len());
            matched.extend(hits);
        }

        let total_hits = matched.len();
        let doc_ids = matched
            .into_iter()
            .take(request.limit)
            .filter_map(|ord| snapshot.doc_id(ord).map(str::to_string))
            .collect();

        Ok(QueryHits {
            doc_ids,
            total_hits,
            generation: snapshot.generation(),
        })
    }
}
