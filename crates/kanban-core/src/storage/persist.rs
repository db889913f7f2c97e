//! Save-on-change persistence of the board document.
//!
//! The document is wrapped in a versioned envelope,
//! `{"state":{"boards":[...],"currentBoard":""},"version":0}`, and written
//! as one blob under the configured key.

use crate::model::BoardDocument;
use crate::storage::{Storage, StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Envelope version written with every blob.
pub const PERSIST_VERSION: u32 = 0;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a BoardDocument,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    state: BoardDocument,
    version: u32,
}

/// Encode a document into its persisted blob.
pub fn encode_document(document: &BoardDocument) -> StorageResult<String> {
    let envelope = EnvelopeRef {
        state: document,
        version: PERSIST_VERSION,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode a persisted blob. Blobs written by another envelope version are rejected.
pub fn decode_document(blob: &str) -> StorageResult<BoardDocument> {
    let envelope: Envelope = serde_json::from_str(blob)?;
    if envelope.version != PERSIST_VERSION {
        return Err(StorageError::Serialization(format!(
            "Unsupported envelope version {} (expected {})",
            envelope.version, PERSIST_VERSION
        )));
    }
    Ok(envelope.state)
}

/// Owns the storage handle and writes the document after each commit.
pub struct PersistenceManager {
    /// Storage backend.
    storage: Arc<dyn Storage>,
    /// Key the document blob lives under.
    key: String,
    /// Last successful save.
    last_save: Option<Instant>,
    /// Whether a committed version has not reached storage yet.
    dirty: bool,
    /// Number of successful saves.
    save_count: u64,
}

impl PersistenceManager {
    /// Create a persistence manager writing under `key`.
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            last_save: None,
            dirty: false,
            save_count: 0,
        }
    }

    /// Key the document is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Mark the document as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if the document has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Time of the last successful save.
    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u64 {
        self.save_count
    }

    /// Write the document immediately.
    pub fn save(&mut self, document: &BoardDocument) -> StorageResult<()> {
        let blob = encode_document(document)?;
        self.storage.write(&self.key, &blob)?;

        self.last_save = Some(Instant::now());
        self.dirty = false;
        self.save_count += 1;
        Ok(())
    }

    /// Load the persisted document.
    ///
    /// Fails soft: a missing, unreadable or malformed blob yields an empty
    /// document.
    pub fn load(&mut self) -> BoardDocument {
        self.dirty = false;
        match self.storage.exists(&self.key) {
            Ok(true) => {}
            Ok(false) => {
                log::info!("No persisted document under '{}', starting empty", self.key);
                return BoardDocument::new();
            }
            Err(e) => {
                log::warn!("Failed to look up '{}', starting empty: {}", self.key, e);
                return BoardDocument::new();
            }
        }

        match self.storage.read(&self.key) {
            Ok(blob) => match decode_document(&blob) {
                Ok(document) => {
                    log::info!(
                        "Loaded {} board(s) from storage key '{}'",
                        document.boards.len(),
                        self.key
                    );
                    document
                }
                Err(e) => {
                    log::warn!("Discarding persisted document under '{}': {}", self.key, e);
                    BoardDocument::new()
                }
            },
            Err(e) => {
                log::warn!("Failed to read '{}', starting empty: {}", self.key, e);
                BoardDocument::new()
            }
        }
    }

    /// Remove the persisted blob.
    pub fn clear(&mut self) -> StorageResult<()> {
        self.storage.remove(&self.key)?;
        self.dirty = false;
        Ok(())
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}

/// Create a platform-appropriate storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::LocalStorage>> {
    Ok(Arc::new(crate::storage::LocalStorage::new()))
}
