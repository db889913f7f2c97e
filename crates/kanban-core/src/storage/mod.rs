//! Storage abstraction for persistence.
//!
//! Backends are plain key-value blob stores. The document is encoded into a
//! single JSON blob by [`PersistenceManager`] and written under one key.

mod memory;
mod persist;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStorage;
pub use persist::{
    PersistenceManager,
    create_default_storage,
    decode_document,
    encode_document,
    PERSIST_VERSION,
};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Blob not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for blob storage backends.
///
/// Implementations can store blobs in memory, on the filesystem, or in the
/// browser's local storage.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Read the blob stored under `key`.
    fn read(&self, key: &str) -> StorageResult<String>;

    /// Write a blob, replacing any previous value.
    fn write(&self, key: &str, blob: &str) -> StorageResult<()>;

    /// Remove a blob. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Check if a blob exists.
    fn exists(&self, key: &str) -> StorageResult<bool>;
}

/// Trait for blob storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Read the blob stored under `key`.
    fn read(&self, key: &str) -> StorageResult<String>;

    /// Write a blob, replacing any previous value.
    fn write(&self, key: &str, blob: &str) -> StorageResult<()>;

    /// Remove a blob. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Check if a blob exists.
    fn exists(&self, key: &str) -> StorageResult<bool>;
}
