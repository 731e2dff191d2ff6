//! Synchronous key/value wrappers over the browser's origin-scoped storage.
//!
//! Two storage areas share one wrapper type: the session-scoped area, cleared
//! when the browsing session ends, and the origin-persisted area, kept across
//! sessions. Values are persisted as text; structured values go through JSON
//! and are classified again on read (see [`StoredValue`]).
//!
//! Availability is checked once at construction. In a host without the
//! backing medium (no window, storage disabled) every operation degrades to
//! a no-op or absent result rather than failing. On non-WASM targets an
//! in-memory medium with the same semantics backs development and tests.

#[cfg(target_arch = "wasm32")]
mod web;
#[cfg(target_arch = "wasm32")]
use web::Medium;

#[cfg(not(target_arch = "wasm32"))]
mod memory;
#[cfg(not(target_arch = "wasm32"))]
use memory::Medium;

mod value;

pub use value::StoredValue;

use std::fmt;

use serde::Serialize;

use crate::error::StoreError;

/// Which browser storage area backs a wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageScope {
    /// Cleared when the browsing session ends.
    Session,
    /// Persisted across sessions for the origin.
    Local,
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session => write!(f, "session storage"),
            Self::Local => write!(f, "local storage"),
        }
    }
}

/// Chainable wrapper over one origin-scoped string key/value storage area.
#[derive(Clone)]
pub struct KeyValueStore {
    scope: StorageScope,
    medium: Option<Medium>,
}

impl KeyValueStore {
    /// Creates a wrapper for `scope`. Never fails: a missing medium leaves
    /// the wrapper in a permanent no-op state.
    pub fn new(scope: StorageScope) -> Self {
        let medium = Medium::acquire(scope);
        if medium.is_none() {
            log::debug!("{scope} is unavailable in this host");
        }
        Self { scope, medium }
    }

    pub fn scope(&self) -> StorageScope {
        self.scope
    }

    /// Whether the backing medium exists in the current host.
    pub fn is_available(&self) -> bool {
        self.medium.is_some()
    }

    /// Writes `value` under `key`. Text is stored verbatim; structured
    /// values are stored as their JSON encoding. No-op when the medium is
    /// unavailable; fails when the underlying write is rejected (quota).
    pub fn add(&self, key: &str, value: impl Into<StoredValue>) -> Result<&Self, StoreError> {
        if let Some(medium) = &self.medium {
            medium.write(key, &value.into().encode())?;
        }
        Ok(self)
    }

    /// Serializes any value through the JSON path and writes it under `key`.
    pub fn add_serialized<T: Serialize>(&self, key: &str, value: &T) -> Result<&Self, StoreError> {
        self.add(key, StoredValue::from_serialize(value)?)
    }

    /// Reads the entry at `key`. `None` when the medium is unavailable, the
    /// key is unset, or the stored text is empty. Text that fails to decode
    /// as JSON comes back as [`StoredValue::Raw`].
    pub fn get(&self, key: &str) -> Option<StoredValue> {
        let medium = self.medium.as_ref()?;
        let text = match medium.read(key) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("failed to read {key:?} from {}: {err}", self.scope);
                return None;
            }
        };
        if text.is_empty() {
            return None;
        }
        Some(StoredValue::decode(text))
    }

    /// Removes the entry at `key` if present. Never fails for a missing key.
    pub fn delete(&self, key: &str) -> &Self {
        if let Some(medium) = &self.medium {
            if let Err(err) = medium.remove(key) {
                log::warn!("failed to remove {key:?} from {}: {err}", self.scope);
            }
        }
        self
    }

    /// Removes every entry in the backing medium.
    pub fn clear_all_keys(&self) {
        if let Some(medium) = &self.medium {
            if let Err(err) = medium.clear() {
                log::warn!("failed to clear {}: {err}", self.scope);
            }
        }
    }
}

thread_local! {
    static SESSION: KeyValueStore = KeyValueStore::new(StorageScope::Session);
    static LOCAL: KeyValueStore = KeyValueStore::new(StorageScope::Local);
}

/// The shared wrapper over the session-scoped storage area.
pub fn session_store() -> KeyValueStore {
    SESSION.with(Clone::clone)
}

/// The shared wrapper over the origin-persisted storage area.
pub fn local_store() -> KeyValueStore {
    LOCAL.with(Clone::clone)
}
