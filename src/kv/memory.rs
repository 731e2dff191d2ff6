//! In-memory backing medium for native builds.
//!
//! Primarily for development and testing: the same call surface as the web
//! medium, with data living only for the process.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StoreError;
use crate::kv::StorageScope;

#[derive(Clone, Default)]
pub(crate) struct Medium {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl Medium {
    pub(crate) fn acquire(_scope: StorageScope) -> Option<Self> {
        Some(Self::default())
    }

    pub(crate) fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    pub(crate) fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    pub(crate) fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    pub(crate) fn clear(&self) -> Result<(), StoreError> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}
