//! Error types for the store capability

use thiserror::Error;

use crate::objects::ObjectKind;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by [`crate::ObjectStore`] implementations.
///
/// All variants are `Clone + PartialEq` so callers (and test doubles) can
/// carry prepared errors by value and compare them in assertions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No object of the given kind/namespace/name exists.
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: ObjectKind,
        namespace: String,
        name: String,
    },

    /// More than one object matched where a single result is required.
    /// The store enforces no uniqueness, so this is reachable.
    #[error("{kind} {namespace}/{name} is ambiguous: {matched} objects matched")]
    Ambiguous {
        kind: ObjectKind,
        namespace: String,
        name: String,
        matched: usize,
    },

    /// A stored payload could not be decoded into the expected shape.
    #[error("Decoding stored object failed: {0}")]
    Decode(String),

    /// The backing store itself failed (connection, query, authorization).
    #[error("Store backend failed: {0}")]
    Backend(String),
}
