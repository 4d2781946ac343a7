//! SurrealDB schema initialization
//!
//! Sets up the single `objects` table the store backend uses.
//! Safe to call multiple times (idempotent).

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Initialize the Slipway store schema.
///
/// Schema:
/// ```text
/// TABLE objects {
///   kind:       STRING (one of the ObjectKind names)
///   namespace:  STRING ("" for cluster-scoped objects)
///   name:       STRING
///   labels:     OBJECT (flat string map)
///   object:     OBJECT (full AnyObject payload)
/// }
/// ```
///
/// No uniqueness constraint on (kind, namespace, name): the store does not
/// enforce identity, and `get` must be able to observe duplicates and
/// report them as `Ambiguous`.
pub async fn init_schema(db: &Surreal<Any>) -> StoreResult<()> {
    debug!("Initializing objects table");

    let sql = r#"
        DEFINE TABLE objects
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete FULL;

        -- Index kind for per-kind listings
        DEFINE INDEX idx_kind ON TABLE objects COLUMNS kind;

        -- Composite index (kind, namespace) for the list path
        DEFINE INDEX idx_kind_namespace ON TABLE objects COLUMNS kind, namespace;

        -- Composite index (kind, namespace, name) for the get path.
        -- Deliberately not UNIQUE: duplicate identities must stay observable.
        DEFINE INDEX idx_kind_namespace_name ON TABLE objects COLUMNS kind, namespace, name;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

    info!("Slipway store schema initialized");
    Ok(())
}
