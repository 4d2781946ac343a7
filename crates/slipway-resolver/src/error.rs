//! Error types for resolution operations

use thiserror::Error;

use slipway_store::{ObjectKind, StoreError};

/// Result type for resolution operations
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Errors surfaced by [`crate::GraphResolver`] operations.
///
/// Store errors pass through untranslated: timeouts, authorization
/// failures, `NotFound`, and `Ambiguous` all reach the caller as the store
/// reported them. The resolver never recovers from a missing relationship
/// by guessing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The underlying store failed or found nothing.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The input object carries no label or field for the requested
    /// relationship, so there is nothing to look up.
    #[error("{kind} {namespace}/{name} has no {relation} associated with it")]
    MissingReference {
        kind: ObjectKind,
        namespace: String,
        name: String,
        relation: &'static str,
    },

    /// Best-available selection found no deployment target class for the
    /// sandbox provisioner.
    #[error("no available deployment target class for provisioner {provisioner}")]
    NoAvailableTargetClass { provisioner: String },

    /// No snapshot environment binding exists for the application in the
    /// given environment.
    #[error("no snapshot environment binding for application {application} in environment {environment}")]
    NoSnapshotBinding {
        application: String,
        environment: String,
    },
}

impl ResolveError {
    /// Whether this error means "no matching object" rather than a query
    /// failure. Callers requeue or fall back on these; they must not be
    /// conflated with transport errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResolveError::Store(StoreError::NotFound { .. })
                | ResolveError::NoAvailableTargetClass { .. }
                | ResolveError::NoSnapshotBinding { .. }
        )
    }
}
