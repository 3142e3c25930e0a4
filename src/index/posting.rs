//! Posting lists: the set of documents containing one term.
//!
//! Documents are identified inside a snapshot by a dense ordinal
//! ([`DocOrd`]). Ordinals are assigned in ascending document-id order, so a
//! sorted posting list is also sorted by document id.

/// Dense per-snapshot document ordinal.
pub type DocOrd = u32;

/// A sorted, duplicate-free list of document ordinals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    doc_ords: Vec<DocOrd>,
}

impl PostingList {
    /// Create a new empty posting list.
    pub fn new() -> Self {
        PostingList {
            doc_ords: Vec::new(),
        }
    }

    /// Build a posting list from arbitrary ordinals, sorting and deduplicating.
    pub fn from_unsorted(mut doc_ords: Vec<DocOrd>) -> Self {
        doc_ords.sort_unstable();
        doc_ords.dedup();
        PostingList { doc_ords }
    }

    /// Add a document to this list.
    ///
    /// Appending in ascending order is O(1); anything else falls back to a
    /// sorted insert. Adding an ordinal that is already present is a no-op.
    pub fn add(&mut self, doc_ord: DocOrd) {
        match self.doc_ords.last() {
            Some(&last) if last == doc_ord => {}
            Some(&last) if last < doc_ord => self.doc_ords.push(doc_ord),
            None => self.doc_ords.push(doc_ord),
            Some(_) => {
                if let Err(pos) = self.doc_ords.binary_search(&doc_ord) {
                    self.doc_ords.insert(pos, doc_ord);
                }
            }
        }
    }

    /// Check whether the list contains an ordinal.
    pub fn contains(&self, doc_ord: DocOrd) -> bool {
        self.doc_ords.binary_search(&doc_ord).is_ok()
    }

    /// Number of documents in the list.
    pub fn len(&self) -> usize {
        self.doc_ords.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.doc_ords.is_empty()
    }

    /// Iterate over ordinals in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = DocOrd> + '_ {
        self.doc_ords.iter().copied()
    }

    /// Borrow the ordinals as a sorted slice.
    pub fn as_slice(&self) -> &[DocOrd] {
        &self.doc_ords
    }

    /// Documents present in both lists.
    pub fn intersect(&self, other: &PostingList) -> PostingList {
        let (a, b) = (&self.doc_ords, &other.doc_ords);
        let mut out = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0usize, 0usize);
        while i < a.len() && j < b.len() {
            let (x, y) = (a[i], b[j]);
            if x == y {
                out.push(x);
                i += 1;
                j += 1;
            } else if x < y {
                i += 1;
            } else {
                j += 1;
            }
        }
        PostingList { doc_ords: out }
    }

    /// Documents present in either list.
    pub fn union(&self, other: &PostingList) -> PostingList {
        let (a, b) = (&self.doc_ords, &other.doc_ords);
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0usize, 0usize);
        while i < a.len() && j < b.len() {
            let (x, y) = (a[i], b[j]);
            if x == y {
                out.push(x);
                i += 1;
                j += 1;
            } else if x < y {
                out.push(x);
                i += 1;
            } else {
                out.push(y);
                j += 1;
            }
        }
        out.extend_from_slice(&a[i..]);
        out.extend_from_slice(&b[j..]);
        PostingList { doc_ords: out }
    }
}

impl FromIterator<DocOrd> for PostingList {
    fn from_iter<I: IntoIterator<Item = DocOrd>>(iter: I) -> Self {
        PostingList::from_unsorted(iter.into_iter().collect())
    }
}

/// Intersect any number of posting lists, smallest first.
///
/// An empty input yields an empty list rather than "all documents": a word
/// with no terms has no candidates.
pub fn intersect_all(mut lists: Vec<&PostingList>) -> PostingList {
    lists.sort_by_key(|list| list.len());
    let mut iter = lists.into_iter();
    let Some(first) = iter.next() else {
        return PostingList::new();
    };

    let mut acc = first.clone();
    for list in iter {
        if acc.is_empty() {
            break;
        }
        acc = acc.intersect(list);
    }
    acc
}

/// Union any number of posting lists.
pub fn union_all<'a, I>(lists: I) -> PostingList
where
    I: IntoIterator<Item = &'a PostingList>,
{
    lists
        .into_iter()
        .flat_map(|list| list.iter())
        .collect()
}
