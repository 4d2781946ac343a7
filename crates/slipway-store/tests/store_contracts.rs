//! Contract tests for the ObjectStore capability.
//!
//! The same behavioral suite runs against `MemoryStore` and `SurrealStore`
//! (in-memory engine). Any conforming backend must pass these.

use slipway_store::{
    get_as, labels, Application, ApplicationSpec, Component, ComponentSpec, LabelSelector,
    MemoryStore, ObjectMeta, ObjectStore, ReleasePlan, ReleasePlanSpec, StoreError, SurrealStore,
};

fn sample_application(name: &str) -> Application {
    Application {
        meta: ObjectMeta::new(name, "default"),
        spec: ApplicationSpec {
            display_name: name.to_string(),
            description: "This is an example application".to_string(),
        },
    }
}

fn sample_component(name: &str, application: &str) -> Component {
    Component {
        meta: ObjectMeta::new(name, "default")
            .with_label(labels::APPLICATION, application),
        spec: ComponentSpec {
            application: application.to_string(),
            container_image: String::new(),
        },
    }
}

fn sample_release_plan(name: &str, auto_release: Option<&str>) -> ReleasePlan {
    let mut meta = ObjectMeta::new(name, "default");
    if let Some(value) = auto_release {
        meta = meta.with_label(labels::AUTO_RELEASE, value);
    }
    ReleasePlan {
        meta,
        spec: ReleasePlanSpec {
            application: "application-sample".to_string(),
            target: "default".to_string(),
        },
    }
}

// ===========================================================================
// MemoryStore
// ===========================================================================

mod memory_store {
    use super::*;
    use slipway_store::ObjectKind;

    #[tokio::test]
    async fn get_returns_seeded_object() {
        let store = MemoryStore::new();
        store.insert(sample_application("application-sample"));

        let app: Application = get_as(&store, "default", "application-sample").await.unwrap();
        assert_eq!(app.meta.name, "application-sample");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .get(ObjectKind::Application, "default", "missing")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn get_duplicate_identity_is_ambiguous() {
        let store = MemoryStore::new();
        store.insert(sample_application("application-sample"));
        store.insert(sample_application("application-sample"));

        let err = store
            .get(ObjectKind::Application, "default", "application-sample")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Ambiguous { matched: 2, .. }));
    }

    #[tokio::test]
    async fn get_is_namespace_scoped() {
        let store = MemoryStore::new();
        store.insert(sample_application("application-sample"));

        let err = store
            .get(ObjectKind::Application, "other-namespace", "application-sample")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_empty_is_ok_not_error() {
        let store = MemoryStore::new();
        let components = store
            .list(ObjectKind::Component, "default", &LabelSelector::default())
            .await
            .unwrap();

        assert!(components.is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_selector() {
        let store = MemoryStore::new();
        store.insert(sample_component("component-sample", "application-sample"));
        store.insert(sample_component("other-component", "other-application"));

        let selector = LabelSelector::new().eq(labels::APPLICATION, "application-sample");
        let components = store
            .list(ObjectKind::Component, "default", &selector)
            .await
            .unwrap();

        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name(), "component-sample");
    }

    #[tokio::test]
    async fn list_not_in_treats_absent_label_as_match() {
        let store = MemoryStore::new();
        store.insert(sample_release_plan("plan-no-label", None));
        store.insert(sample_release_plan("plan-false", Some("false")));
        store.insert(sample_release_plan("plan-true", Some("true")));

        let selector = LabelSelector::new().not_in(labels::AUTO_RELEASE, &["false"]);
        let plans = store
            .list(ObjectKind::ReleasePlan, "default", &selector)
            .await
            .unwrap();

        let names: Vec<&str> = plans.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["plan-no-label", "plan-true"]);
    }

    #[tokio::test]
    async fn list_orders_by_name_ascending() {
        let store = MemoryStore::new();
        store.insert(sample_application("charlie"));
        store.insert(sample_application("alpha"));
        store.insert(sample_application("bravo"));

        let apps = store
            .list(ObjectKind::Application, "default", &LabelSelector::default())
            .await
            .unwrap();

        let names: Vec<&str> = apps.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["alpha", "bravo", "charlie"]);
    }

    #[tokio::test]
    async fn delete_removes_object() {
        let store = MemoryStore::new();
        store.insert(sample_application("application-sample"));
        store.delete(ObjectKind::Application, "default", "application-sample");

        let err = store
            .get(ObjectKind::Application, "default", "application-sample")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}

// ===========================================================================
// SurrealStore (in-memory engine)
// ===========================================================================

mod surreal_store {
    use super::*;
    use slipway_store::ObjectKind;

    #[tokio::test]
    async fn get_returns_seeded_object() {
        let store = SurrealStore::connect_memory().await.unwrap();
        store
            .insert(sample_application("application-sample"))
            .await
            .unwrap();

        let app: Application = get_as(&store, "default", "application-sample").await.unwrap();
        assert_eq!(app.meta.name, "application-sample");
        assert_eq!(app.spec.description, "This is an example application");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = SurrealStore::connect_memory().await.unwrap();
        let err = store
            .get(ObjectKind::Application, "default", "missing")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn get_duplicate_identity_is_ambiguous() {
        let store = SurrealStore::connect_memory().await.unwrap();
        store
            .insert(sample_application("application-sample"))
            .await
            .unwrap();
        store
            .insert(sample_application("application-sample"))
            .await
            .unwrap();

        let err = store
            .get(ObjectKind::Application, "default", "application-sample")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Ambiguous { matched: 2, .. }));
    }

    #[tokio::test]
    async fn list_empty_is_ok_not_error() {
        let store = SurrealStore::connect_memory().await.unwrap();
        let components = store
            .list(ObjectKind::Component, "default", &LabelSelector::default())
            .await
            .unwrap();

        assert!(components.is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_selector() {
        let store = SurrealStore::connect_memory().await.unwrap();
        store
            .insert(sample_component("component-sample", "application-sample"))
            .await
            .unwrap();
        store
            .insert(sample_component("other-component", "other-application"))
            .await
            .unwrap();

        let selector = LabelSelector::new().eq(labels::APPLICATION, "application-sample");
        let components = store
            .list(ObjectKind::Component, "default", &selector)
            .await
            .unwrap();

        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name(), "component-sample");
    }

    #[tokio::test]
    async fn list_not_in_treats_absent_label_as_match() {
        let store = SurrealStore::connect_memory().await.unwrap();
        store
            .insert(sample_release_plan("plan-no-label", None))
            .await
            .unwrap();
        store
            .insert(sample_release_plan("plan-false", Some("false")))
            .await
            .unwrap();
        store
            .insert(sample_release_plan("plan-true", Some("true")))
            .await
            .unwrap();

        let selector = LabelSelector::new().not_in(labels::AUTO_RELEASE, &["false"]);
        let plans = store
            .list(ObjectKind::ReleasePlan, "default", &selector)
            .await
            .unwrap();

        let names: Vec<&str> = plans.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["plan-no-label", "plan-true"]);
    }

    #[tokio::test]
    async fn list_orders_by_name_ascending() {
        let store = SurrealStore::connect_memory().await.unwrap();
        store.insert(sample_application("charlie")).await.unwrap();
        store.insert(sample_application("alpha")).await.unwrap();
        store.insert(sample_application("bravo")).await.unwrap();

        let apps = store
            .list(ObjectKind::Application, "default", &LabelSelector::default())
            .await
            .unwrap();

        let names: Vec<&str> = apps.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["alpha", "bravo", "charlie"]);
    }

    #[tokio::test]
    async fn delete_removes_object() {
        let store = SurrealStore::connect_memory().await.unwrap();
        store
            .insert(sample_application("application-sample"))
            .await
            .unwrap();
        store
            .delete(ObjectKind::Application, "default", "application-sample")
            .await
            .unwrap();

        let err = store
            .get(ObjectKind::Application, "default", "application-sample")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
