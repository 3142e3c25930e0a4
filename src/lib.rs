//! # Tessera
//!
//! A per-collection full-text engine for text without word delimiters.
//!
//! ## Features
//!
//! - Overlapping bigram tokenization, no dictionary required
//! - Staged writes with last-write-wins per document id
//! - Copy-on-commit inverted indexes: queries never block on commits
//! - Exact substring matching, verified against retained document text
//! - Optional durable snapshots through pluggable storage backends
//!
//! ## Example
//!
//! ```
//! use tessera::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let store = CollectionStore::in_memory();
//! store.source("test", "id 0", "全文检索引擎")?;
//! store.source("test", "id 1", "开源工具包")?;
//! store.index("test")?;
//!
//! let ids = store.query("test", ["全文", "开源"], 1024)?;
//! assert_eq!(ids.len(), 2);
//! assert!(store.query("test", ["Java"], 1024)?.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod index;
pub mod ingest;
pub mod persist;
pub mod query;
pub mod storage;
pub mod store;

pub mod prelude {
    pub use crate::analysis::tokenizer::{BigramTokenizer, Tokenizer};
    pub use crate::collection::{CollectionStats, CommitSummary};
    pub use crate::config::StoreConfig;
    pub use crate::error::{Result, TesseraError};
    pub use crate::query::{QueryHits, QueryRequest};
    pub use crate::store::CollectionStore;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
