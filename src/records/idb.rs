//! IndexedDB record engine for browser targets.
//!
//! Wraps the callback-based IndexedDB API in a Rust-friendly async interface
//! over the web-sys bindings. Schema setup runs inside the engine's
//! versioned-upgrade callback, so it executes exactly once per version bump.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Array;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    DomException, IdbDatabase, IdbFactory, IdbObjectStore, IdbOpenDbRequest, IdbRequest,
    IdbTransactionMode, IdbVersionChangeEvent,
};

use crate::error::StoreError;
use crate::records::config::StoreConfig;
use crate::records::key::RecordKey;

/// Live handle to an open database.
#[derive(Clone)]
pub(crate) struct Connection {
    db: IdbDatabase,
    store_name: String,
}

impl Connection {
    /// Opens `config.db_name` at `config.version`, creating the object store
    /// and optional index on first open or version upgrade.
    pub(crate) async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let factory = indexed_db_factory()?;

        let request = factory
            .open_with_u32(&config.db_name, config.version)
            .map_err(|e| StoreError::Open(format!("{:?}", e)))?;

        let store_name = config.store_name.clone();
        let key_path = config.effective_key_path().to_owned();
        let auto_increment = config.auto_increment();
        let index_name = config.index_name.clone();

        let onupgradeneeded = Closure::wrap(Box::new(move |event: IdbVersionChangeEvent| {
            let request: IdbOpenDbRequest = event
                .target()
                .unwrap()
                .dyn_into()
                .expect("upgrade event targets the open request");
            let db: IdbDatabase = request.result().unwrap().dyn_into().unwrap();

            if db.object_store_names().contains(&store_name) {
                return;
            }

            let params = web_sys::IdbObjectStoreParameters::new();
            js_sys::Reflect::set(&params, &"keyPath".into(), &JsValue::from_str(&key_path))
                .expect("set keyPath");
            js_sys::Reflect::set(
                &params,
                &"autoIncrement".into(),
                &JsValue::from_bool(auto_increment),
            )
            .expect("set autoIncrement");

            let store = db
                .create_object_store_with_optional_parameters(&store_name, &params)
                .expect("create object store");
            if let Some(index) = &index_name {
                store.create_index_with_str(index, index).expect("create index");
            }
            log::info!("created object store {store_name} (key path {key_path})");
        }) as Box<dyn FnMut(_)>);

        request.set_onupgradeneeded(Some(onupgradeneeded.as_ref().unchecked_ref()));
        onupgradeneeded.forget(); // must outlive the open request

        let result = wait_for_request(&request)
            .await
            .map_err(|e| StoreError::Open(e.describe()))?;

        let db: IdbDatabase = result
            .dyn_into()
            .map_err(|_| StoreError::Open("result is not a database handle".to_owned()))?;

        log::info!("opened database {} v{}", config.db_name, config.version);

        Ok(Self {
            db,
            store_name: config.store_name.clone(),
        })
    }

    /// Inserts a record, returning the key the engine settled on.
    pub(crate) async fn insert(&self, record: Value) -> Result<RecordKey, StoreError> {
        let store = self.object_store(IdbTransactionMode::Readwrite)?;
        let js_record = json_to_js(&record)?;
        let request = store
            .add(&js_record)
            .map_err(|e| StoreError::Transaction(format!("{:?}", e)))?;

        let result = wait_for_request(&request)
            .await
            .map_err(RequestError::into_store_error)?;

        js_to_key(&result)
            .ok_or_else(|| StoreError::Transaction("engine returned an unusable key".to_owned()))
    }

    pub(crate) async fn fetch(&self, key: &RecordKey) -> Result<Option<Value>, StoreError> {
        let store = self.object_store(IdbTransactionMode::Readonly)?;
        let request = store
            .get(&key_to_js(key))
            .map_err(|e| StoreError::Transaction(format!("{:?}", e)))?;

        let result = wait_for_request(&request)
            .await
            .map_err(RequestError::into_store_error)?;

        if result.is_undefined() || result.is_null() {
            return Ok(None);
        }
        js_to_json(&result).map(Some)
    }

    pub(crate) async fn remove(&self, key: &RecordKey) -> Result<(), StoreError> {
        let store = self.object_store(IdbTransactionMode::Readwrite)?;
        let request = store
            .delete(&key_to_js(key))
            .map_err(|e| StoreError::Transaction(format!("{:?}", e)))?;

        wait_for_request(&request)
            .await
            .map_err(RequestError::into_store_error)?;
        Ok(())
    }

    pub(crate) async fn clear(&self) -> Result<(), StoreError> {
        let store = self.object_store(IdbTransactionMode::Readwrite)?;
        let request = store
            .clear()
            .map_err(|e| StoreError::Transaction(format!("{:?}", e)))?;

        wait_for_request(&request)
            .await
            .map_err(RequestError::into_store_error)?;
        Ok(())
    }

    /// Every record in the store, in the engine's key order.
    pub(crate) async fn fetch_all(&self) -> Result<Vec<Value>, StoreError> {
        let store = self.object_store(IdbTransactionMode::Readonly)?;
        let request = store
            .get_all()
            .map_err(|e| StoreError::Transaction(format!("{:?}", e)))?;

        let result = wait_for_request(&request)
            .await
            .map_err(RequestError::into_store_error)?;

        let array = Array::from(&result);
        let mut records = Vec::with_capacity(array.length() as usize);
        for i in 0..array.length() {
            records.push(js_to_json(&array.get(i))?);
        }
        Ok(records)
    }

    /// Opens a single-purpose transaction and returns its object store.
    fn object_store(&self, mode: IdbTransactionMode) -> Result<IdbObjectStore, StoreError> {
        let transaction = self
            .db
            .transaction_with_str_and_mode(&self.store_name, mode)
            .map_err(|e| StoreError::Transaction(format!("{:?}", e)))?;
        transaction
            .object_store(&self.store_name)
            .map_err(|e| StoreError::Transaction(format!("{:?}", e)))
    }
}

/// Deletes the named database.
pub(crate) async fn delete_database(name: &str) -> Result<(), StoreError> {
    let factory = indexed_db_factory()?;
    let request = factory
        .delete_database(name)
        .map_err(|e| StoreError::Open(format!("{:?}", e)))?;

    wait_for_request(&request)
        .await
        .map_err(|e| StoreError::Open(e.describe()))?;
    Ok(())
}

fn indexed_db_factory() -> Result<IdbFactory, StoreError> {
    let window =
        web_sys::window().ok_or_else(|| StoreError::Open("no window object".to_owned()))?;
    window
        .indexed_db()
        .map_err(|e| StoreError::Open(format!("{:?}", e)))?
        .ok_or_else(|| StoreError::Open("IndexedDB not available".to_owned()))
}

fn json_to_js(value: &Value) -> Result<JsValue, StoreError> {
    js_sys::JSON::parse(&value.to_string())
        .map_err(|e| StoreError::Serialization(format!("{:?}", e)))
}

fn js_to_json(value: &JsValue) -> Result<Value, StoreError> {
    let text = js_sys::JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
        .ok_or_else(|| StoreError::Serialization("value is not JSON-representable".to_owned()))?;
    serde_json::from_str(&text).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn key_to_js(key: &RecordKey) -> JsValue {
    match key {
        RecordKey::Number(n) => JsValue::from_f64(*n),
        RecordKey::Text(s) => JsValue::from_str(s),
    }
}

fn js_to_key(value: &JsValue) -> Option<RecordKey> {
    if let Some(n) = value.as_f64() {
        return Some(RecordKey::Number(n));
    }
    value.as_string().map(RecordKey::Text)
}

/// A failed IndexedDB request, keeping the exception name so constraint
/// violations stay distinguishable.
struct RequestError {
    name: String,
    message: String,
}

impl RequestError {
    fn from_exception(exception: Option<DomException>) -> Self {
        match exception {
            Some(e) => Self {
                name: e.name(),
                message: e.message(),
            },
            None => Self {
                name: "UnknownError".to_owned(),
                message: "unknown engine error".to_owned(),
            },
        }
    }

    fn describe(&self) -> String {
        format!("{}: {}", self.name, self.message)
    }

    fn into_store_error(self) -> StoreError {
        if self.name == "ConstraintError" {
            StoreError::Constraint(self.message)
        } else {
            StoreError::Transaction(self.describe())
        }
    }
}

/// Waits for an IDB request to complete and returns its result.
async fn wait_for_request(request: &IdbRequest) -> Result<JsValue, RequestError> {
    let (tx, rx) = futures_channel::oneshot::channel::<Result<JsValue, RequestError>>();
    let tx = Rc::new(RefCell::new(Some(tx)));

    let tx_success = tx.clone();
    let onsuccess = Closure::wrap(Box::new(move |event: web_sys::Event| {
        let request: IdbRequest = event
            .target()
            .unwrap()
            .dyn_into()
            .expect("event targets a request");
        let result = request.result().unwrap_or(JsValue::UNDEFINED);
        if let Some(tx) = tx_success.borrow_mut().take() {
            let _ = tx.send(Ok(result));
        }
    }) as Box<dyn FnMut(_)>);

    let tx_error = tx;
    let onerror = Closure::wrap(Box::new(move |event: web_sys::Event| {
        let request: IdbRequest = event
            .target()
            .unwrap()
            .dyn_into()
            .expect("event targets a request");
        let error = RequestError::from_exception(request.error().ok().flatten());
        if let Some(tx) = tx_error.borrow_mut().take() {
            let _ = tx.send(Err(error));
        }
    }) as Box<dyn FnMut(_)>);

    request.set_onsuccess(Some(onsuccess.as_ref().unchecked_ref()));
    request.set_onerror(Some(onerror.as_ref().unchecked_ref()));

    let result = rx.await.map_err(|_| RequestError {
        name: "ChannelClosed".to_owned(),
        message: "request dropped before completion".to_owned(),
    });

    request.set_onsuccess(None);
    request.set_onerror(None);

    drop(onsuccess);
    drop(onerror);

    result?
}
