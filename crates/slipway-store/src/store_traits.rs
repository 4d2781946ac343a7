//! Store capability definition
//!
//! `ObjectStore` is the single external capability the resolution layer
//! depends on: a synchronous request/response read surface over the
//! cluster-native object store. Backends are expected to honor caller
//! cancellation (dropping the future) mid-request; no retries or caching
//! happen at this layer.

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::labels::LabelSelector;
use crate::objects::{AnyObject, ObjectKind, StoreObject};

/// Read capability over the object store.
///
/// Guarantees:
/// - `get` returns exactly one object, `NotFound` for zero matches, and
///   `Ambiguous` when more than one object shares the kind/namespace/name
///   (the store enforces no uniqueness).
/// - `list` returns `Ok(vec![])` for no matches, never an error; results
///   are ordered ascending by object name, stable across identical calls.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch a single object by kind, namespace, and name.
    async fn get(&self, kind: ObjectKind, namespace: &str, name: &str)
        -> StoreResult<AnyObject>;

    /// List objects of a kind in a namespace matching a label selector.
    async fn list(
        &self,
        kind: ObjectKind,
        namespace: &str,
        selector: &LabelSelector,
    ) -> StoreResult<Vec<AnyObject>>;
}

/// Fetch a single object and project it to its concrete type.
pub async fn get_as<T: StoreObject>(
    store: &dyn ObjectStore,
    namespace: &str,
    name: &str,
) -> StoreResult<T> {
    let obj = store.get(T::KIND, namespace, name).await?;
    let kind = obj.kind();
    T::from_any(obj).ok_or_else(|| {
        StoreError::Decode(format!("expected {} object, store returned {}", T::KIND, kind))
    })
}

/// List objects and project each to its concrete type.
pub async fn list_as<T: StoreObject>(
    store: &dyn ObjectStore,
    namespace: &str,
    selector: &LabelSelector,
) -> StoreResult<Vec<T>> {
    let objects = store.list(T::KIND, namespace, selector).await?;
    objects
        .into_iter()
        .map(|obj| {
            let kind = obj.kind();
            T::from_any(obj).ok_or_else(|| {
                StoreError::Decode(format!(
                    "expected {} object, store returned {}",
                    T::KIND,
                    kind
                ))
            })
        })
        .collect()
}
