//! Inverted index structures.
//!
//! A collection's committed index is an immutable [`IndexSnapshot`]:
//! a term dictionary mapping bigrams to [`PostingList`]s plus the retained
//! text of every document, both built by [`SnapshotBuilder`] from one
//! staging snapshot.

pub mod builder;
pub mod posting;
pub mod snapshot;

pub use builder::SnapshotBuilder;
pub use posting::{DocOrd, PostingList};
pub use snapshot::IndexSnapshot;
