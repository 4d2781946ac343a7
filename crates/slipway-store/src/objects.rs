//! Object model for the delivery graph
//!
//! Every entity here is externally owned: collaborating controllers create,
//! mutate, and delete them; this crate only reads committed state. The types
//! carry exactly the spec fields needed to resolve relationships, not the
//! full domain schema of each object.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Common object metadata: identity, namespace, labels, annotations.
///
/// An empty `namespace` marks a cluster-scoped object
/// (only `DeploymentTargetClass` today).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }

    /// Add a label, builder-style. Used heavily when seeding fixtures.
    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Add an annotation, builder-style.
    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }
}

/// The kinds of objects the store can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Application,
    Component,
    Snapshot,
    Environment,
    DeploymentTargetClass,
    DeploymentTarget,
    DeploymentTargetClaim,
    IntegrationTestScenario,
    PipelineRun,
    TaskRun,
    SnapshotEnvironmentBinding,
    Release,
    ReleasePlan,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Application => "Application",
            ObjectKind::Component => "Component",
            ObjectKind::Snapshot => "Snapshot",
            ObjectKind::Environment => "Environment",
            ObjectKind::DeploymentTargetClass => "DeploymentTargetClass",
            ObjectKind::DeploymentTarget => "DeploymentTarget",
            ObjectKind::DeploymentTargetClaim => "DeploymentTargetClaim",
            ObjectKind::IntegrationTestScenario => "IntegrationTestScenario",
            ObjectKind::PipelineRun => "PipelineRun",
            ObjectKind::TaskRun => "TaskRun",
            ObjectKind::SnapshotEnvironmentBinding => "SnapshotEnvironmentBinding",
            ObjectKind::Release => "Release",
            ObjectKind::ReleasePlan => "ReleasePlan",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Top-level unit grouping components, snapshots, and test scenarios.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub meta: ObjectMeta,
    pub spec: ApplicationSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSpec {
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

/// A buildable source unit belonging to one Application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub meta: ObjectMeta,
    pub spec: ComponentSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Name reference to the owning Application.
    pub application: String,
    #[serde(default)]
    pub container_image: String,
}

/// An immutable set of component image references at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub meta: ObjectMeta,
    pub spec: SnapshotSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSpec {
    /// Name reference to the owning Application.
    pub application: String,
    /// The components captured by this snapshot. Membership here, not
    /// labels, decides which Components belong to the snapshot.
    #[serde(default)]
    pub components: Vec<SnapshotComponent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotComponent {
    pub name: String,
    pub container_image: String,
}

/// A named deployment target configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub meta: ObjectMeta,
    pub spec: EnvironmentSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSpec {
    pub display_name: String,
    /// Name reference to the DeploymentTargetClaim backing this
    /// environment, if any.
    #[serde(default)]
    pub target_claim: Option<String>,
}

/// A provisioner class. Cluster-scoped (empty namespace).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTargetClass {
    pub meta: ObjectMeta,
    pub spec: DeploymentTargetClassSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTargetClassSpec {
    pub provisioner: String,
}

/// A provisioned cluster credential set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTarget {
    pub meta: ObjectMeta,
    pub spec: DeploymentTargetSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTargetSpec {
    pub class_name: String,
    pub cluster: ClusterCredentials,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterCredentials {
    pub api_url: String,
    pub default_namespace: String,
    pub credentials_secret: String,
}

/// A binding request for a DeploymentTarget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTargetClaim {
    pub meta: ObjectMeta,
    pub spec: DeploymentTargetClaimSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTargetClaimSpec {
    pub class_name: String,
    /// Name reference to the bound DeploymentTarget, once provisioned.
    #[serde(default)]
    pub target_name: Option<String>,
}

/// A test definition bound to an Application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationTestScenario {
    pub meta: ObjectMeta,
    pub spec: IntegrationTestScenarioSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationTestScenarioSpec {
    /// Name reference to the owning Application.
    pub application: String,
    pub pipeline: RemotePipelineRef,
}

/// Where the scenario's test pipeline definition lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePipelineRef {
    pub url: String,
    pub revision: String,
    pub path: String,
}

/// An execution of a build or test pipeline. Its labels link it to the
/// Application, Component, Snapshot, Environment, and TestScenario that
/// form its logical pipeline graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub meta: ObjectMeta,
    pub spec: PipelineRunSpec,
    #[serde(default)]
    pub status: PipelineRunStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRunSpec {
    pub pipeline: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRunStatus {
    /// TaskRuns spawned by this run, in execution order.
    #[serde(default)]
    pub child_references: Vec<ChildReference>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completion_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildReference {
    /// Name of the TaskRun object.
    pub name: String,
    /// The pipeline task that produced it.
    pub pipeline_task: String,
}

/// A single task execution inside a PipelineRun.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRun {
    pub meta: ObjectMeta,
    pub spec: TaskRunSpec,
    #[serde(default)]
    pub status: TaskRunStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRunSpec {
    pub task: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRunStatus {
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completion_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub results: Vec<TaskRunResult>,
}

/// A structured result payload emitted by a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRunResult {
    pub name: String,
    pub value: String,
}

/// Name of the result payload carrying a task's test verdict.
pub const TEST_OUTPUT_RESULT: &str = "TEST_OUTPUT";

/// The parsed test verdict of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutput {
    pub result: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub successes: u64,
    #[serde(default)]
    pub failures: u64,
    #[serde(default)]
    pub warnings: u64,
}

impl TaskRun {
    /// Parse the `TEST_OUTPUT` result payload, if the task emitted one.
    ///
    /// Returns `Ok(None)` when no such result exists and `Decode` when the
    /// payload is present but not valid JSON of the expected shape.
    pub fn test_output(&self) -> StoreResult<Option<TestOutput>> {
        let Some(result) = self
            .status
            .results
            .iter()
            .find(|r| r.name == TEST_OUTPUT_RESULT)
        else {
            return Ok(None);
        };
        serde_json::from_str(&result.value)
            .map(Some)
            .map_err(|e| StoreError::Decode(format!("TEST_OUTPUT payload: {e}")))
    }
}

/// Binds a Snapshot to an Environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEnvironmentBinding {
    pub meta: ObjectMeta,
    pub spec: SnapshotEnvironmentBindingSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEnvironmentBindingSpec {
    pub application: String,
    pub snapshot: String,
    pub environment: String,
}

/// A request to release a Snapshot under a ReleasePlan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub meta: ObjectMeta,
    pub spec: ReleaseSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSpec {
    pub snapshot: String,
    pub release_plan: String,
}

/// An auto-release policy for an Application. Opted in unless its
/// auto-release label is explicitly `"false"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePlan {
    pub meta: ObjectMeta,
    pub spec: ReleasePlanSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePlanSpec {
    pub application: String,
    pub target: String,
}

// ---------------------------------------------------------------------------
// AnyObject - tagged union over all kinds
// ---------------------------------------------------------------------------

/// A store object of any kind.
///
/// The store traffics in `AnyObject`; typed access goes through
/// [`StoreObject`] and the `get_as`/`list_as` helpers, which check the kind
/// at the boundary instead of discovering mismatches via runtime panics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "object")]
pub enum AnyObject {
    Application(Application),
    Component(Component),
    Snapshot(Snapshot),
    Environment(Environment),
    DeploymentTargetClass(DeploymentTargetClass),
    DeploymentTarget(DeploymentTarget),
    DeploymentTargetClaim(DeploymentTargetClaim),
    IntegrationTestScenario(IntegrationTestScenario),
    PipelineRun(PipelineRun),
    TaskRun(TaskRun),
    SnapshotEnvironmentBinding(SnapshotEnvironmentBinding),
    Release(Release),
    ReleasePlan(ReleasePlan),
}

impl AnyObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            AnyObject::Application(_) => ObjectKind::Application,
            AnyObject::Component(_) => ObjectKind::Component,
            AnyObject::Snapshot(_) => ObjectKind::Snapshot,
            AnyObject::Environment(_) => ObjectKind::Environment,
            AnyObject::DeploymentTargetClass(_) => ObjectKind::DeploymentTargetClass,
            AnyObject::DeploymentTarget(_) => ObjectKind::DeploymentTarget,
            AnyObject::DeploymentTargetClaim(_) => ObjectKind::DeploymentTargetClaim,
            AnyObject::IntegrationTestScenario(_) => ObjectKind::IntegrationTestScenario,
            AnyObject::PipelineRun(_) => ObjectKind::PipelineRun,
            AnyObject::TaskRun(_) => ObjectKind::TaskRun,
            AnyObject::SnapshotEnvironmentBinding(_) => ObjectKind::SnapshotEnvironmentBinding,
            AnyObject::Release(_) => ObjectKind::Release,
            AnyObject::ReleasePlan(_) => ObjectKind::ReleasePlan,
        }
    }

    pub fn meta(&self) -> &ObjectMeta {
        match self {
            AnyObject::Application(o) => &o.meta,
            AnyObject::Component(o) => &o.meta,
            AnyObject::Snapshot(o) => &o.meta,
            AnyObject::Environment(o) => &o.meta,
            AnyObject::DeploymentTargetClass(o) => &o.meta,
            AnyObject::DeploymentTarget(o) => &o.meta,
            AnyObject::DeploymentTargetClaim(o) => &o.meta,
            AnyObject::IntegrationTestScenario(o) => &o.meta,
            AnyObject::PipelineRun(o) => &o.meta,
            AnyObject::TaskRun(o) => &o.meta,
            AnyObject::SnapshotEnvironmentBinding(o) => &o.meta,
            AnyObject::Release(o) => &o.meta,
            AnyObject::ReleasePlan(o) => &o.meta,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    pub fn namespace(&self) -> &str {
        &self.meta().namespace
    }
}

/// Links an entity type to its [`ObjectKind`] and its projection
/// from/to [`AnyObject`].
pub trait StoreObject: Clone + Send + Sync + Sized {
    const KIND: ObjectKind;

    fn meta(&self) -> &ObjectMeta;

    fn into_any(self) -> AnyObject;

    /// Recover the typed object. `None` on a kind mismatch.
    fn from_any(obj: AnyObject) -> Option<Self>;
}

macro_rules! impl_store_object {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl StoreObject for $ty {
                const KIND: ObjectKind = ObjectKind::$ty;

                fn meta(&self) -> &ObjectMeta {
                    &self.meta
                }

                fn into_any(self) -> AnyObject {
                    AnyObject::$ty(self)
                }

                fn from_any(obj: AnyObject) -> Option<Self> {
                    match obj {
                        AnyObject::$ty(o) => Some(o),
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_store_object!(
    Application,
    Component,
    Snapshot,
    Environment,
    DeploymentTargetClass,
    DeploymentTarget,
    DeploymentTargetClaim,
    IntegrationTestScenario,
    PipelineRun,
    TaskRun,
    SnapshotEnvironmentBinding,
    Release,
    ReleasePlan,
);
