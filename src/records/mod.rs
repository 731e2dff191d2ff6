//! Transactional record store over the browser's versioned database engine.
//!
//! ## Components
//!
//! - [`StoreConfig`]: database name, schema version, store name, optional
//!   key-path and secondary index
//! - [`RecordStore`]: the chainable, typed facade — one single-purpose
//!   transaction per operation
//! - `connection`: the lazily-established, memoized connection cell
//!
//! The engine is IndexedDB on `wasm32`. Native builds use an in-memory
//! engine with the same observable semantics, so application code and tests
//! run unchanged off the browser.

mod config;
mod connection;
mod key;
mod store;

#[cfg(target_arch = "wasm32")]
mod idb;
#[cfg(target_arch = "wasm32")]
pub(crate) use idb::Connection;

#[cfg(not(target_arch = "wasm32"))]
mod memory;
#[cfg(not(target_arch = "wasm32"))]
pub(crate) use memory::Connection;

pub use config::StoreConfig;
pub use key::RecordKey;
pub use store::RecordStore;

use crate::error::StoreError;

/// Deletes the named database, dropping every store in it.
///
/// Intended for tests and teardown; open connections in other contexts may
/// delay the deletion until they close.
pub async fn delete_database(name: &str) -> Result<(), StoreError> {
    #[cfg(target_arch = "wasm32")]
    {
        idb::delete_database(name).await
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        memory::delete_database(name).await
    }
}
