//! Web Storage backing medium for browser targets.

use web_sys::Storage;

use crate::error::StoreError;
use crate::kv::StorageScope;

/// Handle to one of the browser's origin-scoped storage areas.
#[derive(Clone)]
pub(crate) struct Medium {
    storage: Storage,
}

impl Medium {
    /// Acquires the storage area for `scope`, if the host provides one.
    ///
    /// Returns `None` outside a window context or when storage is disabled.
    pub(crate) fn acquire(scope: StorageScope) -> Option<Self> {
        let window = web_sys::window()?;
        let storage = match scope {
            StorageScope::Session => window.session_storage(),
            StorageScope::Local => window.local_storage(),
        };
        storage.ok().flatten().map(|storage| Self { storage })
    }

    pub(crate) fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(key)
            .map_err(|e| StoreError::Medium(format!("{:?}", e)))
    }

    pub(crate) fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::Medium(format!("{:?}", e)))
    }

    pub(crate) fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StoreError::Medium(format!("{:?}", e)))
    }

    pub(crate) fn clear(&self) -> Result<(), StoreError> {
        self.storage
            .clear()
            .map_err(|e| StoreError::Medium(format!("{:?}", e)))
    }
}
