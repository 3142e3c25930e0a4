//! Storage backends for committed snapshots.
//!
//! Persistence is optional: a store without storage keeps everything in
//! memory. When configured, committed collection snapshots are written
//! through the [`Storage`] trait.

pub mod file;
pub mod memory;
pub mod traits;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use traits::{Storage, StorageError, StorageInput, StorageOutput};

/// Storage configuration, one variant per backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// File-based storage configuration (includes path)
    File(file::FileStorageConfig),

    /// Memory-based storage configuration
    Memory(memory::MemoryStorageConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory(memory::MemoryStorageConfig::default())
    }
}

/// A factory for creating storage instances.
///
/// # Example
///
/// ```
/// use tessera::storage::{StorageConfig, StorageFactory};
/// use tessera::storage::memory::MemoryStorageConfig;
///
/// # fn main() -> tessera::error::Result<()> {
/// let storage = StorageFactory::create(StorageConfig::Memory(MemoryStorageConfig::default()))?;
/// assert!(storage.list_files()?.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct StorageFactory;

impl StorageFactory {
    /// Create a new storage instance with the given configuration.
    pub fn create(config: StorageConfig) -> Result<Arc<dyn Storage>> {
        match config {
            StorageConfig::Memory(mem_config) => {
                Ok(Arc::new(memory::MemoryStorage::new(mem_config)))
            }
            StorageConfig::File(file_config) => Ok(Arc::new(file::FileStorage::new(file_config)?)),
        }
    }
}
