//! SurrealDB-backed ObjectStore implementation
//!
//! Persists each object as one `objects` row carrying its identity columns,
//! its label map, and the full `AnyObject` payload as JSON. Conversion
//! between rows and domain objects happens at this boundary; label
//! filtering is applied in Rust after decode so selector semantics have a
//! single implementation shared with `MemoryStore`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::labels::LabelSelector;
use crate::migrations;
use crate::objects::{AnyObject, ObjectKind, StoreObject};
use crate::store_traits::ObjectStore;

/// One `objects` table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ObjectRow {
    kind: String,
    namespace: String,
    name: String,
    labels: BTreeMap<String, String>,
    object: serde_json::Value,
}

impl ObjectRow {
    fn from_object(any: &AnyObject) -> StoreResult<Self> {
        Ok(Self {
            kind: any.kind().as_str().to_string(),
            namespace: any.namespace().to_string(),
            name: any.name().to_string(),
            labels: any.meta().labels.clone(),
            object: serde_json::to_value(any)
                .map_err(|e| StoreError::Decode(e.to_string()))?,
        })
    }

    fn into_object(self) -> StoreResult<AnyObject> {
        serde_json::from_value(self.object).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// SurrealDB-backed implementation of [`ObjectStore`].
pub struct SurrealStore {
    db: Surreal<Any>,
}

impl SurrealStore {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://`, selects `slipway/main`, and runs `init_schema`.
    pub async fn connect_memory() -> StoreResult<Self> {
        let db = surrealdb::engine::any::connect("mem://")
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        db.use_ns("slipway")
            .use_db("main")
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        migrations::init_schema(&db).await?;

        info!("SurrealStore connected (in-memory)");
        Ok(Self { db })
    }

    /// Create from environment variables.
    ///
    /// Uses `SLIPWAY_STORE_URL` when set; otherwise falls back to local
    /// persistence under `.slipway/db`.
    pub async fn from_env() -> StoreResult<Self> {
        if let Ok(url) = std::env::var("SLIPWAY_STORE_URL") {
            let db = surrealdb::engine::any::connect(&url)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;

            db.use_ns("slipway")
                .use_db("main")
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;

            migrations::init_schema(&db).await?;
            info!("SurrealStore connected ({})", url);
            return Ok(Self { db });
        }

        let path = ".slipway/db";
        std::fs::create_dir_all(path).map_err(|e| {
            StoreError::Backend(format!("Failed to create store directory {}: {}", path, e))
        })?;
        let url = format!("surrealkv://{}", path);
        info!(
            "No SLIPWAY_STORE_URL found, using local persistence: {}",
            url
        );

        let db = surrealdb::engine::any::connect(&url)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to {}: {}", url, e)))?;

        db.use_ns("slipway")
            .use_db("main")
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        migrations::init_schema(&db).await?;
        Ok(Self { db })
    }

    /// Seed an object. Mirrors `MemoryStore::insert` so contract tests can
    /// drive both backends identically.
    pub async fn insert<T: StoreObject>(&self, object: T) -> StoreResult<()> {
        let any = object.into_any();
        let row = ObjectRow::from_object(&any)?;

        debug!(kind = %any.kind(), name = %any.name(), "inserting object");

        let _created: Option<ObjectRow> = self
            .db
            .create("objects")
            .content(row)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }

    /// Remove every object with the given identity. No-op if absent.
    pub async fn delete(
        &self,
        kind: ObjectKind,
        namespace: &str,
        name: &str,
    ) -> StoreResult<()> {
        self.db
            .query("DELETE FROM objects WHERE kind = $kind AND namespace = $ns AND name = $name")
            .bind(("kind", kind.as_str().to_string()))
            .bind(("ns", namespace.to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn fetch_rows(
        &self,
        kind: ObjectKind,
        namespace: &str,
        name: Option<&str>,
    ) -> StoreResult<Vec<ObjectRow>> {
        let mut query = String::from(
            "SELECT kind, namespace, name, labels, object FROM objects \
             WHERE kind = $kind AND namespace = $ns",
        );
        if name.is_some() {
            query.push_str(" AND name = $name");
        }
        query.push_str(" ORDER BY name ASC");

        let mut req = self
            .db
            .query(query)
            .bind(("kind", kind.as_str().to_string()))
            .bind(("ns", namespace.to_string()));
        if let Some(name) = name {
            req = req.bind(("name", name.to_string()));
        }

        let mut res = req.await.map_err(|e| StoreError::Backend(e.to_string()))?;
        res.take(0).map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[async_trait]
impl ObjectStore for SurrealStore {
    async fn get(
        &self,
        kind: ObjectKind,
        namespace: &str,
        name: &str,
    ) -> StoreResult<AnyObject> {
        let mut rows = self.fetch_rows(kind, namespace, Some(name)).await?;

        match rows.len() {
            0 => Err(StoreError::NotFound {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
            1 => rows.remove(0).into_object(),
            matched => Err(StoreError::Ambiguous {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
                matched,
            }),
        }
    }

    async fn list(
        &self,
        kind: ObjectKind,
        namespace: &str,
        selector: &LabelSelector,
    ) -> StoreResult<Vec<AnyObject>> {
        let rows = self.fetch_rows(kind, namespace, None).await?;

        rows.into_iter()
            .filter(|row| selector.matches(&row.labels))
            .map(ObjectRow::into_object)
            .collect()
    }
}
