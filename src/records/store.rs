//! Chainable record store facade.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;
use crate::records::config::{StoreConfig, DEFAULT_KEY_PATH};
use crate::records::connection::ConnectionCell;
use crate::records::key::RecordKey;

/// Typed, chainable facade over one object store in a named database.
///
/// The connection is established lazily on the first operation and memoized
/// for the facade's lifetime. Each operation opens a fresh, single-purpose
/// transaction and awaits that transaction's single request. Any failed
/// operation discards the memoized connection, so the next call pays a
/// one-time reopen instead of reusing a connection left in a broken state.
///
/// Mutation methods resolve with `&Self` for chaining:
///
/// ```ignore
/// let store: RecordStore<Item> = RecordStore::new(StoreConfig::new("d1", "items"));
/// store.add(&first).await?.add(&second).await?;
/// let items = store.get_all().await?;
/// ```
pub struct RecordStore<T> {
    connection: ConnectionCell,
    _record: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for RecordStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("config", self.connection.config())
            .finish_non_exhaustive()
    }
}

impl<T> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> RecordStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a facade for `config`. No connection is opened until the
    /// first operation.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            connection: ConnectionCell::new(config),
            _record: PhantomData,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        self.connection.config()
    }

    /// Inserts `value`. The key comes from the record's key-path field, or
    /// from the key generator when the field is absent and no key-path is
    /// configured. Fails with [`StoreError::Constraint`] when a record with
    /// the resulting key already exists.
    pub async fn add(&self, value: &T) -> Result<&Self, StoreError> {
        let record = self.encode(value)?;
        let conn = self.connection.connect().await?;
        conn.insert(record).await.map_err(|e| self.discard(e))?;
        Ok(self)
    }

    /// Inserts `value` under an explicit key.
    ///
    /// The key is written through the default key-path when the
    /// configuration names none; a configured key-path takes precedence and
    /// the explicit key is ignored.
    pub async fn add_with_key(
        &self,
        value: &T,
        key: impl Into<RecordKey>,
    ) -> Result<&Self, StoreError> {
        let mut record = self.encode(value)?;
        if self.config().key_path.is_none() {
            let Value::Object(fields) = &mut record else {
                return Err(StoreError::Data(
                    "explicit keys require object records".to_owned(),
                ));
            };
            fields.insert(DEFAULT_KEY_PATH.to_owned(), key.into().to_json());
        }
        let conn = self.connection.connect().await?;
        conn.insert(record).await.map_err(|e| self.discard(e))?;
        Ok(self)
    }

    /// Returns the record at `key`, or `None` when no such record exists.
    pub async fn get(&self, key: impl Into<RecordKey>) -> Result<Option<T>, StoreError> {
        let conn = self.connection.connect().await?;
        let record = conn
            .fetch(&key.into())
            .await
            .map_err(|e| self.discard(e))?;
        record.map(Self::decode).transpose()
    }

    /// Removes the record at `key`; succeeds silently when absent.
    pub async fn delete(&self, key: impl Into<RecordKey>) -> Result<&Self, StoreError> {
        let conn = self.connection.connect().await?;
        conn.remove(&key.into())
            .await
            .map_err(|e| self.discard(e))?;
        Ok(self)
    }

    /// Removes every record in the store.
    pub async fn clear_all(&self) -> Result<&Self, StoreError> {
        let conn = self.connection.connect().await?;
        conn.clear().await.map_err(|e| self.discard(e))?;
        Ok(self)
    }

    /// Returns every record in the store, in primary-key order.
    pub async fn get_all(&self) -> Result<Vec<T>, StoreError> {
        let conn = self.connection.connect().await?;
        let records = conn.fetch_all().await.map_err(|e| self.discard(e))?;
        records.into_iter().map(Self::decode).collect()
    }

    fn encode(&self, value: &T) -> Result<Value, StoreError> {
        serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode(value: Value) -> Result<T, StoreError> {
        serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Discards the memoized connection so the next operation reopens it.
    fn discard(&self, err: StoreError) -> StoreError {
        log::warn!(
            "operation on store {:?} failed, discarding connection: {err}",
            self.config().store_name
        );
        self.connection.reset();
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_executor::block_on;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<i64>,
        title: String,
        description: String,
        status: bool,
    }

    fn item(title: &str) -> Item {
        Item {
            id: None,
            title: title.to_owned(),
            description: "x".to_owned(),
            status: true,
        }
    }

    #[test]
    fn test_add_then_get_all_then_clear_all() {
        block_on(async {
            let store: RecordStore<Item> = RecordStore::new(StoreConfig::new("d1", "items"));
            store.add(&item("a")).await.unwrap();

            let all = store.get_all().await.unwrap();
            assert_eq!(all.len(), 1);
            assert_eq!(all[0].title, "a");
            assert_eq!(all[0].id, Some(1));

            store.clear_all().await.unwrap();
            assert!(store.get_all().await.unwrap().is_empty());
        });
    }

    #[test]
    fn test_generated_keys_are_sequential() {
        block_on(async {
            let store: RecordStore<Item> =
                RecordStore::new(StoreConfig::new("store-gen", "items"));
            store.add(&item("a")).await.unwrap().add(&item("b")).await.unwrap();

            let first = store.get(1).await.unwrap().unwrap();
            assert_eq!(first.title, "a");
            let second = store.get(2).await.unwrap().unwrap();
            assert_eq!(second.title, "b");
        });
    }

    #[test]
    fn test_get_all_returns_every_record() {
        block_on(async {
            let store: RecordStore<Item> =
                RecordStore::new(StoreConfig::new("store-all", "items"));
            for i in 0..5 {
                store.add(&item(&format!("item-{i}"))).await.unwrap();
            }
            assert_eq!(store.get_all().await.unwrap().len(), 5);
        });
    }

    #[test]
    fn test_get_missing_key_is_none() {
        block_on(async {
            let store: RecordStore<Item> =
                RecordStore::new(StoreConfig::new("store-missing", "items"));
            assert_eq!(store.get(42).await.unwrap(), None);
        });
    }

    #[test]
    fn test_delete_is_silent_for_missing_keys() {
        block_on(async {
            let store: RecordStore<Item> =
                RecordStore::new(StoreConfig::new("store-del", "items"));
            store.add(&item("kept")).await.unwrap();
            store.delete(99).await.unwrap();
            assert_eq!(store.get_all().await.unwrap().len(), 1);

            store.delete(1).await.unwrap();
            assert!(store.get_all().await.unwrap().is_empty());
        });
    }

    #[test]
    fn test_explicit_key_without_key_path() {
        block_on(async {
            let store: RecordStore<serde_json::Value> =
                RecordStore::new(StoreConfig::new("store-explicit", "items"));
            store
                .add_with_key(&json!({"title": "pinned"}), "custom")
                .await
                .unwrap();

            let read = store.get("custom").await.unwrap().unwrap();
            assert_eq!(read["title"], "pinned");
            assert_eq!(read["id"], "custom");
        });
    }

    #[test]
    fn test_explicit_key_requires_object_records() {
        block_on(async {
            let store: RecordStore<i64> =
                RecordStore::new(StoreConfig::new("store-scalar", "items"));
            let err = store.add_with_key(&7, "k").await.unwrap_err();
            assert!(matches!(err, StoreError::Data(_)));
        });
    }

    #[test]
    fn test_key_path_store_round_trip() {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        struct Article {
            slug: String,
            title: String,
        }

        block_on(async {
            let store: RecordStore<Article> = RecordStore::new(
                StoreConfig::new("store-slug", "articles").with_key_path("slug"),
            );
            let article = Article {
                slug: "intro".to_owned(),
                title: "Introduction".to_owned(),
            };
            store.add(&article).await.unwrap();

            // No injected field: the record round-trips unchanged.
            assert_eq!(store.get("intro").await.unwrap(), Some(article.clone()));

            // A configured key-path wins over an explicit key.
            let other = Article {
                slug: "next".to_owned(),
                title: "Next".to_owned(),
            };
            store.add_with_key(&other, "ignored").await.unwrap();
            assert_eq!(store.get("next").await.unwrap(), Some(other));
            assert_eq!(store.get("ignored").await.unwrap(), None);
        });
    }

    #[test]
    fn test_duplicate_key_is_a_constraint_error() {
        block_on(async {
            let store: RecordStore<serde_json::Value> = RecordStore::new(
                StoreConfig::new("store-dup", "articles").with_key_path("slug"),
            );
            store.add(&json!({"slug": "a", "n": 1})).await.unwrap();
            let err = store.add(&json!({"slug": "a", "n": 2})).await.unwrap_err();
            assert!(matches!(err, StoreError::Constraint(_)));
        });
    }

    #[test]
    fn test_missing_key_path_field_fails() {
        block_on(async {
            let store: RecordStore<serde_json::Value> = RecordStore::new(
                StoreConfig::new("store-nokey", "articles").with_key_path("slug"),
            );
            let err = store.add(&json!({"title": "no slug"})).await.unwrap_err();
            assert!(matches!(err, StoreError::Data(_)));
        });
    }

    #[test]
    fn test_failed_operation_discards_the_connection() {
        block_on(async {
            let store: RecordStore<serde_json::Value> = RecordStore::new(
                StoreConfig::new("store-recover", "articles").with_key_path("slug"),
            );
            store.add(&json!({"slug": "a"})).await.unwrap();
            store.add(&json!({"slug": "a"})).await.unwrap_err();

            // The next operation transparently reopens and still sees the
            // committed record.
            assert_eq!(store.get_all().await.unwrap().len(), 1);
            store.add(&json!({"slug": "b"})).await.unwrap();
            assert_eq!(store.get_all().await.unwrap().len(), 2);
        });
    }

    #[test]
    fn test_get_all_is_in_key_order() {
        block_on(async {
            let store: RecordStore<serde_json::Value> = RecordStore::new(
                StoreConfig::new("store-order", "articles").with_key_path("slug"),
            );
            store.add(&json!({"slug": "b"})).await.unwrap();
            store.add(&json!({"slug": "a"})).await.unwrap();
            store.add(&json!({"slug": "c"})).await.unwrap();

            let slugs: Vec<String> = store
                .get_all()
                .await
                .unwrap()
                .into_iter()
                .map(|v| v["slug"].as_str().unwrap().to_owned())
                .collect();
            assert_eq!(slugs, vec!["a", "b", "c"]);
        });
    }
}
