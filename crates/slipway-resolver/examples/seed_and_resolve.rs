//! Seed an in-memory store and resolve a few edges of the delivery graph.
//! Run with: cargo run --package slipway-resolver --example seed_and_resolve

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use slipway_resolver::{GraphResolver, StoreResolver};
use slipway_store::{
    labels, Application, ApplicationSpec, Component, ComponentSpec, MemoryStore, ObjectMeta,
    Snapshot, SnapshotComponent, SnapshotSpec,
};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = MemoryStore::new();

    store.insert(Application {
        meta: ObjectMeta::new("application-sample", "default"),
        spec: ApplicationSpec {
            display_name: "application-sample".to_string(),
            description: "This is an example application".to_string(),
        },
    });
    store.insert(Component {
        meta: ObjectMeta::new("component-sample", "default"),
        spec: ComponentSpec {
            application: "application-sample".to_string(),
            container_image: "registry.example/sample-image".to_string(),
        },
    });
    let snapshot = Snapshot {
        meta: ObjectMeta::new("snapshot-sample", "default")
            .with_label(labels::COMPONENT, "component-sample"),
        spec: SnapshotSpec {
            application: "application-sample".to_string(),
            components: vec![SnapshotComponent {
                name: "component-sample".to_string(),
                container_image: "registry.example/sample-image".to_string(),
            }],
        },
    };
    store.insert(snapshot.clone());

    let resolver = StoreResolver::new();

    let application = resolver.application_for_snapshot(&store, &snapshot).await?;
    tracing::info!(application = %application.meta.name, "resolved application from snapshot");

    let component = resolver.component_for_snapshot(&store, &snapshot).await?;
    tracing::info!(component = %component.meta.name, "resolved component from snapshot label");

    let members = resolver.all_snapshot_components(&store, &snapshot).await?;
    tracing::info!(members = members.len(), "resolved snapshot component membership");

    Ok(())
}
