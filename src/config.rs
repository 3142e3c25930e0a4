//! Store configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TesseraError};
use crate::index::builder::DEFAULT_PARALLEL_THRESHOLD;
use crate::storage::StorageConfig;
use crate::storage::file::FileStorageConfig;

/// Configuration for a [`CollectionStore`](crate::store::CollectionStore).
///
/// # Examples
///
/// ```
/// use tessera::config::StoreConfig;
///
/// let config: StoreConfig = serde_json::from_str(
///     r#"{"storage": {"type": "file", "path": "/var/lib/tessera"}, "max_query_limit": 500}"#,
/// ).unwrap();
/// assert!(config.storage.is_some());
/// assert_eq!(config.max_query_limit, Some(500));
/// assert_eq!(config.parallel_commit_threshold, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Where committed snapshots are persisted; `None` keeps them in memory only.
    #[serde(default)]
    pub storage: Option<StorageConfig>,

    /// Staged-document count at which commits tokenize on the rayon pool.
    #[serde(default = "default_parallel_commit_threshold")]
    pub parallel_commit_threshold: usize,

    /// Upper bound applied to every query's caller-supplied limit.
    #[serde(default)]
    pub max_query_limit: Option<usize>,
}

fn default_parallel_commit_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            storage: None,
            parallel_commit_threshold: default_parallel_commit_threshold(),
            max_query_limit: None,
        }
    }
}

impl StoreConfig {
    /// Configuration persisting snapshots under `path`.
    pub fn with_data_dir<P: AsRef<Path>>(path: P) -> Self {
        StoreConfig {
            storage: Some(StorageConfig::File(FileStorageConfig::new(path))),
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TesseraError::invalid_config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: StoreConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that can never work.
    pub fn validate(&self) -> Result<()> {
        if self.parallel_commit_threshold == 0 {
            return Err(TesseraError::invalid_config(
                "parallel_commit_threshold must be at least 1",
            ));
        }
        if self.max_query_limit == Some(0) {
            return Err(TesseraError::invalid_config(
                "max_query_limit must be at least 1 when set",
            ));
        }
        Ok(())
    }

    /// Apply `max_query_limit` to a caller's limit.
    pub fn effective_limit(&self, limit: usize) -> usize {
        match self.max_query_limit {
            Some(cap) => limit.min(cap),
            None => limit,
        }
    }
}
