//! Construction of an [`IndexSnapshot`] from staged documents.

use std::time::Instant;

use ahash::AHashMap;
use chrono::Utc;
use log::debug;
use rayon::prelude::*;

use crate::analysis::tokenizer::Tokenizer;
use crate::error::{Result, TesseraError};
use crate::index::posting::{DocOrd, PostingList};
use crate::index::snapshot::IndexSnapshot;

/// Default staged-document count at which tokenization moves to rayon.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;

/// Builds a fresh snapshot from a set of `(doc_id, text)` pairs.
///
/// The builder never touches an existing snapshot; the caller decides when
/// the result becomes visible.
pub struct SnapshotBuilder<'a> {
    tokenizer: &'a dyn Tokenizer,
    parallel_threshold: usize,
}

impl<'a> SnapshotBuilder<'a> {
    /// Create a builder using the given tokenizer.
    pub fn new(tokenizer: &'a dyn Tokenizer) -> Self {
        SnapshotBuilder {
            tokenizer,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Set the document count at which tokenization runs on the rayon pool.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    /// Build a snapshot at `generation`.
    ///
    /// Texts are copied into the snapshot; `documents` is left untouched so
    /// the caller can hand it back to staging if the commit is abandoned.
    /// Duplicate ids keep the last occurrence in `documents`.
    pub fn build(&self, documents: &[(String, String)], generation: u64) -> Result<IndexSnapshot> {
        let start = Instant::now();

        // Stable sort so that among equal ids the later entry stays last.
        let mut order: Vec<usize> = (0..documents.len()).collect();
        order.sort_by(|&a, &b| documents[a].0.cmp(&documents[b].0));
        let mut selected: Vec<&(String, String)> = Vec::with_capacity(order.len());
        for idx in order {
            let doc = &documents[idx];
            match selected.last_mut() {
                Some(last) if last.0 == doc.0 => *last = doc,
                _ => selected.push(doc),
            }
        }

        if selected.len() > DocOrd::MAX as usize {
            return Err(TesseraError::index(format!(
                "too many documents in one commit: {}",
                selected.len()
            )));
        }

        let doc_terms: Vec<Vec<String>> = if selected.len() >= self.parallel_threshold {
            selected
                .par_iter()
                .map(|(_, text)| unique_terms(self.tokenizer, text))
                .collect::<Result<Vec<_>>>()?
        } else {
            selected
                .iter()
                .map(|(_, text)| unique_terms(self.tokenizer, text))
                .collect::<Result<Vec<_>>>()?
        };

        // Ordinals are visited in ascending order, so every `add` appends.
        let mut terms: AHashMap<String, PostingList> = AHashMap::new();
        for (ord, doc) in doc_terms.into_iter().enumerate() {
            for term in doc {
                terms.entry(term).or_default().add(ord as DocOrd);
            }
        }

        let (doc_ids, texts): (Vec<String>, Vec<String>) = selected
            .into_iter()
            .map(|(id, text)| (id.clone(), text.clone()))
            .unzip();

        debug!(
            "built snapshot generation {} with {} documents and {} terms in {:?}",
            generation,
            doc_ids.len(),
            terms.len(),
            start.elapsed()
        );

        Ok(IndexSnapshot {
            generation,
            committed_at: Some(Utc::now()),
            doc_ids,
            texts,
            terms,
        })
    }
}

/// Distinct terms of one document, sorted.
fn unique_terms(tokenizer: &dyn Tokenizer, text: &str) -> Result<Vec<String>> {
    let mut terms = tokenizer.terms(text)?;
    terms.sort_unstable();
    terms.dedup();
    Ok(terms)
}
