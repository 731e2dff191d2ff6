//! Browser tests against the real Web Storage and IndexedDB engines.
//!
//! Run with `wasm-pack test --headless --chrome` (or `--firefox`).

#![cfg(target_arch = "wasm32")]

use serde::{Deserialize, Serialize};
use serde_json::json;
use wasm_bindgen_test::*;
use webstash::{
    delete_database, local_store, session_store, RecordStore, StoreConfig, StoredValue,
};

wasm_bindgen_test_configure!(run_in_browser);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    title: String,
    description: String,
    status: bool,
}

#[wasm_bindgen_test]
fn local_storage_round_trips_values() {
    let store = local_store();
    store.clear_all_keys();

    store.add("username", "Test User").unwrap();
    assert_eq!(store.get("username").unwrap().as_text(), Some("Test User"));

    let theme = json!({"primary": "red", "secondary": "yellow"});
    store.add("theme", theme.clone()).unwrap();
    assert_eq!(store.get("theme"), Some(StoredValue::Json(theme)));

    store.add("count", 123).unwrap();
    assert_eq!(store.get("count"), Some(StoredValue::Json(json!(123))));

    store.clear_all_keys();
    assert_eq!(store.get("username"), None);
}

#[wasm_bindgen_test]
fn raw_text_in_the_medium_reads_back_unchanged() {
    let storage = web_sys::window().unwrap().local_storage().unwrap().unwrap();
    storage.set_item("rawString", "this is a raw string").unwrap();

    let value = local_store().get("rawString").unwrap();
    assert_eq!(value, StoredValue::Raw("this is a raw string".to_owned()));

    local_store().delete("rawString");
}

#[wasm_bindgen_test]
fn session_storage_chains_and_deletes() {
    let store = session_store();
    store.clear_all_keys();

    store
        .add("item1", "value1")
        .unwrap()
        .add("item2", "value2")
        .unwrap()
        .delete("item1");

    assert_eq!(store.get("item1"), None);
    assert_eq!(store.get("item2").unwrap().as_text(), Some("value2"));

    store.clear_all_keys();
}

#[wasm_bindgen_test]
async fn record_store_add_get_all_clear_all() {
    delete_database("d1").await.unwrap();

    let store: RecordStore<Item> = RecordStore::new(StoreConfig::new("d1", "items"));
    store
        .add(&Item {
            id: None,
            title: "a".to_owned(),
            description: "x".to_owned(),
            status: true,
        })
        .await
        .unwrap();

    let all = store.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "a");
    assert!(all[0].id.is_some());

    store.clear_all().await.unwrap();
    assert!(store.get_all().await.unwrap().is_empty());
}

#[wasm_bindgen_test]
async fn record_store_get_and_delete_by_key() {
    delete_database("web-keys").await.unwrap();

    let store: RecordStore<Item> = RecordStore::new(StoreConfig::new("web-keys", "items"));
    store
        .add(&Item {
            id: None,
            title: "first".to_owned(),
            description: "x".to_owned(),
            status: false,
        })
        .await
        .unwrap();

    let read = store.get(1).await.unwrap().unwrap();
    assert_eq!(read.title, "first");

    store.delete(1).await.unwrap();
    assert_eq!(store.get(1).await.unwrap(), None);

    // Deleting an absent key succeeds silently.
    store.delete(999).await.unwrap();
}

#[wasm_bindgen_test]
async fn duplicate_keys_reject_and_the_store_recovers() {
    use webstash::StoreError;

    delete_database("web-dup").await.unwrap();

    let store: RecordStore<serde_json::Value> = RecordStore::new(
        StoreConfig::new("web-dup", "articles")
            .with_key_path("slug")
            .with_index("slug"),
    );
    store.add(&json!({"slug": "a", "n": 1})).await.unwrap();

    let err = store.add(&json!({"slug": "a", "n": 2})).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Constraint(_) | StoreError::Transaction(_)
    ));

    // The discarded connection reopens on the next operation.
    assert_eq!(store.get_all().await.unwrap().len(), 1);
}
