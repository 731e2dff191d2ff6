//! Error types for the persistence wrappers.

use thiserror::Error;

/// Errors surfaced by the key/value wrappers and the record store.
///
/// The type is `Clone`: a shared connection attempt hands the same failure
/// to every operation awaiting it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Opening or upgrading the database failed.
    #[error("failed to open database: {0}")]
    Open(String),

    /// The engine reported a failed request.
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// An insert collided with an existing key.
    #[error("key constraint violated: {0}")]
    Constraint(String),

    /// The record or key cannot be used with the store's schema.
    #[error("unusable record or key: {0}")]
    Data(String),

    /// JSON encoding or decoding failed.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A key/value storage medium rejected a write.
    #[error("storage medium error: {0}")]
    Medium(String),
}
