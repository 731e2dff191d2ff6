//! In-memory record engine for native builds.
//!
//! Mirrors the browser engine's versioned open, key derivation, collation,
//! and constraint behavior so the facade works the same in development and
//! tests. Databases live in a thread-local registry for the process only,
//! one logical database per name.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde_json::Value;

use crate::error::StoreError;
use crate::records::config::StoreConfig;
use crate::records::key::RecordKey;

thread_local! {
    static REGISTRY: RefCell<HashMap<String, Rc<RefCell<Database>>>> =
        RefCell::new(HashMap::new());
}

struct Database {
    version: u32,
    stores: HashMap<String, ObjectStore>,
}

struct ObjectStore {
    key_path: String,
    auto_increment: bool,
    next_key: i64,
    records: BTreeMap<RecordKey, Value>,
}

/// Live handle to an open database.
#[derive(Clone)]
pub(crate) struct Connection {
    db: Rc<RefCell<Database>>,
    store_name: String,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("store_name", &self.store_name)
            .finish_non_exhaustive()
    }
}

impl Connection {
    pub(crate) async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.version == 0 {
            return Err(StoreError::Open(
                "database version must be a positive integer".to_owned(),
            ));
        }

        let db = REGISTRY.with(|registry| {
            registry
                .borrow_mut()
                .entry(config.db_name.clone())
                .or_insert_with(|| {
                    Rc::new(RefCell::new(Database {
                        version: 0,
                        stores: HashMap::new(),
                    }))
                })
                .clone()
        });

        {
            let mut inner = db.borrow_mut();
            if config.version < inner.version {
                return Err(StoreError::Open(format!(
                    "requested version {} is below the existing version {}",
                    config.version, inner.version
                )));
            }
            if config.version > inner.version {
                // Versioned upgrade: runs once per bump.
                inner.version = config.version;
                if !inner.stores.contains_key(&config.store_name) {
                    inner.stores.insert(
                        config.store_name.clone(),
                        ObjectStore {
                            key_path: config.effective_key_path().to_owned(),
                            auto_increment: config.auto_increment(),
                            next_key: 1,
                            records: BTreeMap::new(),
                        },
                    );
                    log::info!(
                        "created object store {} (key path {})",
                        config.store_name,
                        config.effective_key_path()
                    );
                    if let Some(index) = &config.index_name {
                        log::info!("created index {index} on {}", config.store_name);
                    }
                }
            }
        }

        Ok(Self {
            db,
            store_name: config.store_name.clone(),
        })
    }

    pub(crate) async fn insert(&self, mut record: Value) -> Result<RecordKey, StoreError> {
        let mut db = self.db.borrow_mut();
        let store = db
            .stores
            .get_mut(&self.store_name)
            .ok_or_else(|| missing_store(&self.store_name))?;

        let Value::Object(fields) = &mut record else {
            return Err(StoreError::Data(
                "records must be objects when the store uses a key path".to_owned(),
            ));
        };

        let key = match fields.get(&store.key_path) {
            Some(value) => RecordKey::from_json(value).ok_or_else(|| {
                StoreError::Data(format!("field {:?} is not a valid key", store.key_path))
            })?,
            None if store.auto_increment => {
                let key = RecordKey::from(store.next_key);
                fields.insert(store.key_path.clone(), key.to_json());
                key
            }
            None => {
                return Err(StoreError::Data(format!(
                    "record is missing key path field {:?}",
                    store.key_path
                )));
            }
        };

        // An in-record numeric key advances the generator past itself.
        if store.auto_increment {
            if let RecordKey::Number(n) = &key {
                let floor = n.floor() as i64;
                if floor >= store.next_key {
                    store.next_key = floor + 1;
                }
            }
        }

        if store.records.contains_key(&key) {
            return Err(StoreError::Constraint(format!(
                "a record with key {key} already exists"
            )));
        }
        store.records.insert(key.clone(), record);
        Ok(key)
    }

    pub(crate) async fn fetch(&self, key: &RecordKey) -> Result<Option<Value>, StoreError> {
        let db = self.db.borrow();
        let store = db
            .stores
            .get(&self.store_name)
            .ok_or_else(|| missing_store(&self.store_name))?;
        Ok(store.records.get(key).cloned())
    }

    pub(crate) async fn remove(&self, key: &RecordKey) -> Result<(), StoreError> {
        let mut db = self.db.borrow_mut();
        let store = db
            .stores
            .get_mut(&self.store_name)
            .ok_or_else(|| missing_store(&self.store_name))?;
        store.records.remove(key);
        Ok(())
    }

    pub(crate) async fn clear(&self) -> Result<(), StoreError> {
        let mut db = self.db.borrow_mut();
        let store = db
            .stores
            .get_mut(&self.store_name)
            .ok_or_else(|| missing_store(&self.store_name))?;
        store.records.clear();
        Ok(())
    }

    /// Every record in the store, in key order.
    pub(crate) async fn fetch_all(&self) -> Result<Vec<Value>, StoreError> {
        let db = self.db.borrow();
        let store = db
            .stores
            .get(&self.store_name)
            .ok_or_else(|| missing_store(&self.store_name))?;
        Ok(store.records.values().cloned().collect())
    }
}

/// Deletes the named database.
pub(crate) async fn delete_database(name: &str) -> Result<(), StoreError> {
    REGISTRY.with(|registry| {
        registry.borrow_mut().remove(name);
    });
    Ok(())
}

fn missing_store(name: &str) -> StoreError {
    StoreError::Transaction(format!("object store {name:?} was not found"))
}
