//! Record key type and ordering.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

/// Primary key of a stored record: a number or a string.
///
/// Ordering follows the engine's collation: numbers before strings, numbers
/// by value, strings lexicographically.
#[derive(Debug, Clone)]
pub enum RecordKey {
    Number(f64),
    Text(String),
}

impl RecordKey {
    /// Builds a key from a record's key-path field. Non-finite numbers and
    /// non-scalar values are not valid keys.
    pub(crate) fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                let n = n.as_f64()?;
                n.is_finite().then_some(Self::Number(n))
            }
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// JSON form of the key. Whole numbers normalize to integers, matching
    /// the engine's untyped numbers.
    pub(crate) fn to_json(&self) -> Value {
        match self {
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Value::from(*n as i64),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl PartialEq for RecordKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RecordKey {}

impl PartialOrd for RecordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for RecordKey {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i64> for RecordKey {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u32> for RecordKey {
    fn from(value: u32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<f64> for RecordKey {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RecordKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
