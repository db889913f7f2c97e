//! Browser `localStorage` implementation for WebAssembly.

use super::{Storage, StorageError, StorageResult};

/// Blob storage backed by `window.localStorage`.
///
/// Holds no handle: the storage object is looked up on every call, since
/// `web_sys::Storage` is not Send/Sync and lookups are cheap.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> StorageResult<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Other("No window object".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Other(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))
    }
}

impl Storage for LocalStorage {
    fn read(&self, key: &str) -> StorageResult<String> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Io(format!("getItem error: {:?}", e)))?
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn write(&self, key: &str, blob: &str) -> StorageResult<()> {
        // Fails when the origin's quota is exhausted.
        Self::storage()?
            .set_item(key, blob)
            .map_err(|e| StorageError::Io(format!("setItem error: {:?}", e)))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Io(format!("removeItem error: {:?}", e)))
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        let item = Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Io(format!("getItem error: {:?}", e)))?;
        Ok(item.is_some())
    }
}
