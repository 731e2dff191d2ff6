//! Entry representation for the key/value wrappers.
//!
//! Web storage only holds text, so every entry is persisted as a string and
//! classified again at read time: text that parses as JSON comes back as a
//! structured value, anything else comes back verbatim. There is no stored
//! type tag.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;

/// A value read from or written to a key/value storage area.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// Verbatim text that does not parse as JSON.
    Raw(String),
    /// A structured value, persisted as its JSON encoding.
    Json(Value),
}

impl StoredValue {
    /// Classifies stored text: best-effort JSON decode with raw fallback.
    pub fn decode(text: impl Into<String>) -> Self {
        let text = text.into();
        match serde_json::from_str(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Raw(text),
        }
    }

    /// The textual form written to the backing medium.
    pub fn encode(&self) -> String {
        match self {
            Self::Raw(text) => text.clone(),
            Self::Json(value) => value.to_string(),
        }
    }

    /// Serializes any value through the JSON arm.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, StoreError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Deserializes a structured entry into `T`. `None` for raw text or a
    /// shape mismatch.
    pub fn parse<T: DeserializeOwned>(&self) -> Option<T> {
        match self {
            Self::Json(value) => serde_json::from_value(value.clone()).ok(),
            Self::Raw(_) => None,
        }
    }

    /// The entry as text, for raw entries and JSON strings.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Raw(text) => Some(text),
            Self::Json(Value::String(text)) => Some(text),
            Self::Json(_) => None,
        }
    }

    /// The structured value, if the entry decoded as JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw(_) => None,
        }
    }
}

impl From<&str> for StoredValue {
    fn from(text: &str) -> Self {
        Self::Raw(text.to_owned())
    }
}

impl From<String> for StoredValue {
    fn from(text: String) -> Self {
        Self::Raw(text)
    }
}

impl From<Value> for StoredValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<bool> for StoredValue {
    fn from(value: bool) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<i32> for StoredValue {
    fn from(value: i32) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<u64> for StoredValue {
    fn from(value: u64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<f64> for StoredValue {
    fn from(value: f64) -> Self {
        Self::Json(Value::from(value))
    }
}
