//! Durable copies of committed collection snapshots.
//!
//! Each collection is written to its own file. A file is laid out as
//! (little-endian):
//!
//! ```text
//! magic "TSNP" | u32 version | u32 crc32(payload) | u64 payload length | payload
//! ```
//!
//! where the payload is the bincode encoding of the collection name, its
//! generation, the commit timestamp and the retained documents. Posting
//! lists are derived data and are rebuilt when the snapshot is loaded.
//!
//! Files are written under a temporary name and renamed into place, so a
//! reader never observes a partially written snapshot.

use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TesseraError};
use crate::index::snapshot::IndexSnapshot;
use crate::storage::Storage;

const SNAPSHOT_MAGIC: &[u8; 4] = b"TSNP";
const SNAPSHOT_FORMAT_VERSION: u32 = 1;
const SNAPSHOT_EXTENSION: &str = ".snap";
const TEMP_SUFFIX: &str = ".tmp";
const HEADER_LEN: usize = 4 + 4 + 4 + 8;
/// Collection-name bytes spelled out in a file name before hashing kicks in.
const MAX_NAME_BYTES_IN_FILE_NAME: usize = 64;

/// A collection snapshot as read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    /// Collection name.
    pub collection: String,
    /// Generation of the committed snapshot.
    pub generation: u64,
    /// Commit timestamp.
    pub committed_at: Option<DateTime<Utc>>,
    /// `(doc_id, text)` pairs in ascending id order.
    pub documents: Vec<(String, String)>,
}

/// Borrowed twin of [`PersistedSnapshot`]; bincode encodes both identically.
#[derive(Serialize)]
struct PersistedSnapshotRef<'a> {
    collection: &'a str,
    generation: u64,
    committed_at: Option<DateTime<Utc>>,
    documents: Vec<(&'a str, &'a str)>,
}

/// Encode a snapshot into the on-disk format.
pub fn encode_snapshot(collection: &str, snapshot: &IndexSnapshot) -> Result<Vec<u8>> {
    let payload = bincode::serialize(&PersistedSnapshotRef {
        collection,
        generation: snapshot.generation(),
        committed_at: snapshot.committed_at(),
        documents: snapshot.documents().collect(),
    })?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.write_all(SNAPSHOT_MAGIC)?;
    bytes.write_u32::<LittleEndian>(SNAPSHOT_FORMAT_VERSION)?;
    bytes.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
    bytes.write_u64::<LittleEndian>(payload.len() as u64)?;
    bytes.write_all(&payload)?;
    Ok(bytes)
}

/// Decode a snapshot file, validating magic, version, length and checksum.
pub fn decode_snapshot(bytes: &[u8]) -> Result<PersistedSnapshot> {
    if bytes.len() < HEADER_LEN {
        return Err(TesseraError::serialization(format!(
            "snapshot truncated: {} bytes",
            bytes.len()
        )));
    }

    let mut cursor = Cursor::new(bytes);
    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic)?;
    if &magic != SNAPSHOT_MAGIC {
        return Err(TesseraError::serialization("bad snapshot magic"));
    }

    let version = cursor.read_u32::<LittleEndian>()?;
    if version != SNAPSHOT_FORMAT_VERSION {
        return Err(TesseraError::serialization(format!(
            "snapshot version mismatch: expected {SNAPSHOT_FORMAT_VERSION}, found {version}"
        )));
    }

    let checksum = cursor.read_u32::<LittleEndian>()?;
    let length = cursor.read_u64::<LittleEndian>()?;
    let payload = &bytes[HEADER_LEN..];
    if payload.len() as u64 != length {
        return Err(TesseraError::serialization(format!(
            "snapshot length mismatch: header says {length}, found {}",
            payload.len()
        )));
    }
    if crc32fast::hash(payload) != checksum {
        return Err(TesseraError::serialization("snapshot checksum mismatch"));
    }

    Ok(bincode::deserialize(payload)?)
}

/// File name holding a collection's snapshot.
///
/// Collection names are arbitrary strings, so the name is hex encoded.
/// Names too long to spell out are truncated and suffixed with a checksum
/// of the full name; the full name is always stored inside the file.
pub fn snapshot_file_name(collection: &str) -> String {
    let bytes = collection.as_bytes();
    let shown = &bytes[..bytes.len().min(MAX_NAME_BYTES_IN_FILE_NAME)];
    let mut name: String = shown.iter().map(|b| format!("{b:02x}")).collect();
    if bytes.len() > MAX_NAME_BYTES_IN_FILE_NAME {
        name.push_str(&format!("-{:08x}", crc32fast::hash(bytes)));
    }
    name.push_str(SNAPSHOT_EXTENSION);
    name
}

/// Reads and writes collection snapshots through a [`Storage`] backend.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    storage: Arc<dyn Storage>,
}

impl SnapshotStore {
    /// Create a snapshot store over the given storage.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        SnapshotStore { storage }
    }

    /// The underlying storage.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Durably replace the stored snapshot of `collection`.
    ///
    /// The snapshot is written and synced under a temporary name and only
    /// then renamed over the previous file, so an error leaves the
    /// previously stored snapshot in place.
    pub fn save(&self, collection: &str, snapshot: &IndexSnapshot) -> Result<()> {
        let bytes = encode_snapshot(collection, snapshot)?;
        let file_name = snapshot_file_name(collection);
        let temp_name = format!("{file_name}{TEMP_SUFFIX}");

        let written = self
            .write_file(&temp_name, &bytes)
            .and_then(|_| self.storage.sync())
            .and_then(|_| self.storage.rename_file(&temp_name, &file_name));
        if let Err(e) = written {
            self.storage.delete_file(&temp_name).ok();
            return Err(e);
        }

        // The new file is already in place under its final name.
        if let Err(e) = self.storage.sync() {
            warn!("failed to sync rename of snapshot file {file_name}: {e}");
        }

        debug!(
            "persisted collection '{}' generation {} ({} bytes)",
            collection,
            snapshot.generation(),
            bytes.len()
        );
        Ok(())
    }

    fn write_file(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let mut output = self.storage.create_output(name)?;
        output.write_all(bytes)?;
        output.flush_and_sync()?;
        output.close()
    }

    /// Load every stored snapshot.
    ///
    /// Unreadable or corrupt files are skipped with a warning; leftover
    /// temporary files from an interrupted save are deleted.
    pub fn load_all(&self) -> Result<Vec<PersistedSnapshot>> {
        let mut snapshots = Vec::new();

        for name in self.storage.list_files()? {
            if name.ends_with(TEMP_SUFFIX) {
                warn!("removing incomplete snapshot file {name}");
                self.storage.delete_file(&name).ok();
                continue;
            }
            if !name.ends_with(SNAPSHOT_EXTENSION) {
                continue;
            }

            match self.read_file(&name) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => warn!("skipping snapshot file {name}: {e}"),
            }
        }

        snapshots.sort_by(|a, b| a.collection.cmp(&b.collection));
        Ok(snapshots)
    }

    fn read_file(&self, name: &str) -> Result<PersistedSnapshot> {
        let mut input = self.storage.open_input(name)?;
        let mut bytes = Vec::with_capacity(input.size()? as usize);
        input.read_to_end(&mut bytes)?;
        decode_snapshot(&bytes)
    }
}
