#![warn(clippy::all)]

//! Chainable persistence wrappers for browser storage backends.
//!
//! Three backends, one small surface:
//!
//! - [`session_store`]: key/value storage scoped to the browsing session
//! - [`local_store`]: key/value storage persisted across sessions for the
//!   origin
//! - [`RecordStore`]: a transactional record store with structured records,
//!   versioned schema setup, and bulk retrieval
//!
//! The key/value wrappers are synchronous and tolerate hosts without the
//! backing medium. The record store is asynchronous: its connection is
//! opened lazily on first use, memoized, and discarded after any failed
//! operation so the next call re-establishes it.
//!
//! On non-WASM targets both backends fall back to in-memory engines with
//! the same observable semantics, so application code and tests run
//! unchanged off the browser.
//!
//! ## Example
//!
//! ```ignore
//! use serde::{Deserialize, Serialize};
//! use webstash::{local_store, RecordStore, StoreConfig};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Item {
//!     title: String,
//!     status: bool,
//! }
//!
//! // Key/value: synchronous and chainable.
//! local_store()
//!     .add("theme", serde_json::json!({"primary": "red"}))?
//!     .add("version", 3)?;
//!
//! // Records: one transaction per operation, chainable on mutation.
//! let items: RecordStore<Item> = RecordStore::new(StoreConfig::new("app", "items"));
//! items.add(&Item { title: "a".into(), status: true }).await?;
//! let all = items.get_all().await?;
//! ```

pub mod error;
pub mod kv;
pub mod records;

pub use error::StoreError;
pub use kv::{local_store, session_store, KeyValueStore, StorageScope, StoredValue};
pub use records::{delete_database, RecordKey, RecordStore, StoreConfig};
