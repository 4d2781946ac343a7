//! In-memory store fake (testing and examples)
//!
//! Satisfies the `ObjectStore` contract without any external dependencies.
//! Objects are held in per-(kind, namespace) bags, so duplicates are
//! representable and the `Ambiguous` contract is reachable in tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::labels::LabelSelector;
use crate::objects::{AnyObject, ObjectKind, StoreObject};
use crate::store_traits::ObjectStore;

/// In-memory `ObjectStore` backed by a `BTreeMap<(kind, namespace), Vec>`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(ObjectKind, String), Vec<AnyObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object. Not part of the read capability; the store's
    /// contents are owned by whoever drives the test or example.
    pub fn insert<T: StoreObject>(&self, object: T) {
        let any = object.into_any();
        let key = (any.kind(), any.namespace().to_string());
        let mut objects = self.objects.lock().unwrap();
        objects.entry(key).or_default().push(any);
    }

    /// Remove every object with the given identity. No-op if absent.
    pub fn delete(&self, kind: ObjectKind, namespace: &str, name: &str) {
        let mut objects = self.objects.lock().unwrap();
        if let Some(bag) = objects.get_mut(&(kind, namespace.to_string())) {
            bag.retain(|o| o.name() != name);
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(
        &self,
        kind: ObjectKind,
        namespace: &str,
        name: &str,
    ) -> StoreResult<AnyObject> {
        let objects = self.objects.lock().unwrap();
        let matches: Vec<&AnyObject> = objects
            .get(&(kind, namespace.to_string()))
            .map(|bag| bag.iter().filter(|o| o.name() == name).collect())
            .unwrap_or_default();

        match matches.len() {
            0 => Err(StoreError::NotFound {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
            1 => Ok(matches[0].clone()),
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
        let objects = self.objects.lock().unwrap();
        let mut matches: Vec<AnyObject> = objects
            .get(&(kind, namespace.to_string()))
            .map(|bag| {
                bag.iter()
                    .filter(|o| selector.matches(&o.meta().labels))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matches.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(matches)
    }
}
