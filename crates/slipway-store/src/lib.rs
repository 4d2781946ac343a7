//! Slipway-Store: Object Model and Store Capability
//!
//! This crate provides the data layer for the Slipway delivery graph. It
//! holds the object model (applications, components, snapshots, pipeline
//! runs, release plans, ...), the label contracts that stand in for foreign
//! keys, and the `ObjectStore` read capability with two backends.
//!
//! ## Key Components
//!
//! - `ObjectStore`: the get/list read capability over the object store
//! - `MemoryStore`: in-memory fake for tests and examples
//! - `SurrealStore`: SurrealDB-backed implementation
//! - `LabelSelector`: conjunctive label filter with `Eq` and `NotIn`
//! - `AnyObject` / `StoreObject`: tagged union over all object kinds and
//!   the typed projection trait

mod error;
pub mod labels;
mod memory;
mod migrations;
mod objects;
mod store_traits;
mod surreal;

pub use error::{StoreError, StoreResult};
pub use labels::{LabelSelector, Requirement};
pub use memory::MemoryStore;
pub use migrations::init_schema;
pub use objects::{
    AnyObject, Application, ApplicationSpec, ChildReference, ClusterCredentials, Component,
    ComponentSpec, DeploymentTarget, DeploymentTargetClaim, DeploymentTargetClaimSpec,
    DeploymentTargetClass, DeploymentTargetClassSpec, DeploymentTargetSpec, Environment,
    EnvironmentSpec, IntegrationTestScenario, IntegrationTestScenarioSpec, ObjectKind,
    ObjectMeta, PipelineRun, PipelineRunSpec, PipelineRunStatus, Release, ReleasePlan,
    ReleasePlanSpec, ReleaseSpec, RemotePipelineRef, Snapshot, SnapshotComponent,
    SnapshotEnvironmentBinding, SnapshotEnvironmentBindingSpec, SnapshotSpec, StoreObject,
    TaskRun, TaskRunResult, TaskRunSpec, TaskRunStatus, TestOutput, TEST_OUTPUT_RESULT,
};
pub use store_traits::{get_as, list_as, ObjectStore};
pub use surreal::SurrealStore;
