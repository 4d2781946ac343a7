//! Graph resolution operations
//!
//! One operation per relationship-resolution need, each a pure read:
//! `(store handle, input object(s)) -> result`. The store enforces no
//! foreign keys, so every edge here is inferred from a name reference in a
//! spec field, an identity label, or membership in an embedded list. No
//! caching, no retries, no background work; cancellation is the caller's
//! (dropping the future abandons the in-flight store call).

use async_trait::async_trait;
use tracing::debug;

use slipway_store::{
    get_as, labels, list_as, Application, Component, DeploymentTarget, DeploymentTargetClaim,
    DeploymentTargetClass, Environment, IntegrationTestScenario, LabelSelector, ObjectMeta,
    ObjectStore, PipelineRun, Release, ReleasePlan, Snapshot, SnapshotEnvironmentBinding,
    StoreObject, TaskRun,
};

use crate::error::{ResolveError, ResolveResult};

/// Provisioner a deployment target class must declare to be usable for
/// ephemeral sandbox environments.
pub const SANDBOX_PROVISIONER: &str = "slipway.io/sandbox";

/// The object resolution capability: one method per query operation.
///
/// Implemented by [`StoreResolver`] (real resolution against the store) and
/// by [`crate::StubResolver`] (per-operation test overlay with fall-through).
#[async_trait]
pub trait GraphResolver: Send + Sync {
    /// Every Environment in the application's namespace.
    async fn all_environments(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<Environment>>;

    /// Releases whose spec references the snapshot by name.
    async fn releases_for_snapshot(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
    ) -> ResolveResult<Vec<Release>>;

    /// Components whose spec references the application by name.
    async fn all_application_components(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<Component>>;

    /// The application's components restricted to those named in the
    /// snapshot's embedded component list. Sharing the namespace and
    /// application is not enough; membership in the snapshot's own record
    /// decides.
    async fn all_snapshot_components(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
    ) -> ResolveResult<Vec<Component>>;

    /// The Application named by the snapshot's spec.
    async fn application_for_snapshot(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
    ) -> ResolveResult<Application>;

    /// The Component named by the snapshot's component identity label.
    async fn component_for_snapshot(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
    ) -> ResolveResult<Component>;

    /// The Component named by the pipeline run's component identity label.
    async fn component_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Component>;

    /// The Application named by the pipeline run's application label.
    async fn application_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Application>;

    /// The Application named by the component's spec.
    async fn application_for_component(
        &self,
        store: &dyn ObjectStore,
        component: &Component,
    ) -> ResolveResult<Application>;

    /// The Environment named by the pipeline run's environment label.
    async fn environment_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Environment>;

    /// The Snapshot named by the pipeline run's snapshot label.
    async fn snapshot_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Snapshot>;

    /// Best-available selection: the first class (in the store's
    /// deterministic listing order) whose provisioner matches
    /// [`SANDBOX_PROVISIONER`]. Absence is `NoAvailableTargetClass`, never
    /// an arbitrary fallback.
    async fn find_available_target_class(
        &self,
        store: &dyn ObjectStore,
    ) -> ResolveResult<DeploymentTargetClass>;

    /// Every test scenario bound to the application.
    async fn all_test_scenarios(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<IntegrationTestScenario>>;

    /// Test scenarios bound to the application, excluding those whose
    /// optionality label is `"true"`. An absent label means required.
    async fn required_test_scenarios(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<IntegrationTestScenario>>;

    /// The DeploymentTargetClaim named by the environment's spec.
    async fn target_claim_for_environment(
        &self,
        store: &dyn ObjectStore,
        environment: &Environment,
    ) -> ResolveResult<DeploymentTargetClaim>;

    /// The DeploymentTarget named by the claim's spec.
    async fn target_for_claim(
        &self,
        store: &dyn ObjectStore,
        claim: &DeploymentTargetClaim,
    ) -> ResolveResult<DeploymentTarget>;

    /// The existing binding of the application's snapshot to the given
    /// environment, if one exists.
    async fn find_snapshot_binding(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
        environment: &Environment,
    ) -> ResolveResult<SnapshotEnvironmentBinding>;

    /// Test pipeline runs carrying both the snapshot's and the scenario's
    /// identity labels.
    async fn pipeline_runs_for_snapshot_and_scenario(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
        scenario: &IntegrationTestScenario,
    ) -> ResolveResult<Vec<PipelineRun>>;

    /// Build pipeline runs carrying the component's identity label.
    async fn build_pipeline_runs_for_component(
        &self,
        store: &dyn ObjectStore,
        component: &Component,
    ) -> ResolveResult<Vec<PipelineRun>>;

    /// Every Snapshot belonging to the application.
    async fn all_snapshots(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<Snapshot>>;

    /// ReleasePlans for the application that have not opted out of
    /// auto-release. Only the exact label value `"false"` opts out; an
    /// absent label opts in. Absence != false is a first-class contract.
    async fn auto_release_plans(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<ReleasePlan>>;

    /// The TaskRuns named in the pipeline run's child references, in
    /// reference order. A dangling reference is `NotFound`.
    async fn task_runs_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Vec<TaskRun>>;
}

/// Real resolution against the store. Stateless: a pure function of its
/// inputs and the store's current contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreResolver;

impl StoreResolver {
    pub fn new() -> Self {
        Self
    }
}

/// Read a label off an object's metadata or fail with `MissingReference`.
fn label_ref<'a, T: StoreObject>(
    object: &'a T,
    key: &str,
    relation: &'static str,
) -> ResolveResult<&'a str> {
    let meta: &ObjectMeta = object.meta();
    meta.labels
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ResolveError::MissingReference {
            kind: T::KIND,
            namespace: meta.namespace.clone(),
            name: meta.name.clone(),
            relation,
        })
}

#[async_trait]
impl GraphResolver for StoreResolver {
    async fn all_environments(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<Environment>> {
        let environments =
            list_as(store, &application.meta.namespace, &LabelSelector::default()).await?;
        Ok(environments)
    }

    async fn releases_for_snapshot(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
    ) -> ResolveResult<Vec<Release>> {
        let releases: Vec<Release> =
            list_as(store, &snapshot.meta.namespace, &LabelSelector::default()).await?;
        Ok(releases
            .into_iter()
            .filter(|r| r.spec.snapshot == snapshot.meta.name)
            .collect())
    }

    async fn all_application_components(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<Component>> {
        let components: Vec<Component> =
            list_as(store, &application.meta.namespace, &LabelSelector::default()).await?;
        Ok(components
            .into_iter()
            .filter(|c| c.spec.application == application.meta.name)
            .collect())
    }

    async fn all_snapshot_components(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
    ) -> ResolveResult<Vec<Component>> {
        let components: Vec<Component> =
            list_as(store, &snapshot.meta.namespace, &LabelSelector::default()).await?;
        // Refine by membership in the snapshot's own record: components of
        // the same application that are not in the snapshot do not belong.
        Ok(components
            .into_iter()
            .filter(|c| c.spec.application == snapshot.spec.application)
            .filter(|c| {
                snapshot
                    .spec
                    .components
                    .iter()
                    .any(|sc| sc.name == c.meta.name)
            })
            .collect())
    }

    async fn application_for_snapshot(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
    ) -> ResolveResult<Application> {
        let application =
            get_as(store, &snapshot.meta.namespace, &snapshot.spec.application).await?;
        Ok(application)
    }

    async fn component_for_snapshot(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
    ) -> ResolveResult<Component> {
        let name = label_ref(snapshot, labels::COMPONENT, "component")?;
        let component = get_as(store, &snapshot.meta.namespace, name).await?;
        Ok(component)
    }

    async fn component_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Component> {
        let name = label_ref(pipeline_run, labels::COMPONENT, "component")?;
        let component = get_as(store, &pipeline_run.meta.namespace, name).await?;
        Ok(component)
    }

    async fn application_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Application> {
        let name = label_ref(pipeline_run, labels::APPLICATION, "application")?;
        let application = get_as(store, &pipeline_run.meta.namespace, name).await?;
        Ok(application)
    }

    async fn application_for_component(
        &self,
        store: &dyn ObjectStore,
        component: &Component,
    ) -> ResolveResult<Application> {
        let application =
            get_as(store, &component.meta.namespace, &component.spec.application).await?;
        Ok(application)
    }

    async fn environment_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Environment> {
        let name = label_ref(pipeline_run, labels::ENVIRONMENT, "environment")?;
        let environment = get_as(store, &pipeline_run.meta.namespace, name).await?;
        Ok(environment)
    }

    async fn snapshot_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Snapshot> {
        let name = label_ref(pipeline_run, labels::SNAPSHOT, "snapshot")?;
        let snapshot = get_as(store, &pipeline_run.meta.namespace, name).await?;
        Ok(snapshot)
    }

    async fn find_available_target_class(
        &self,
        store: &dyn ObjectStore,
    ) -> ResolveResult<DeploymentTargetClass> {
        // Cluster-scoped: empty namespace. First match in the store's
        // name-ascending listing order keeps the selection deterministic.
        let classes: Vec<DeploymentTargetClass> =
            list_as(store, "", &LabelSelector::default()).await?;
        classes
            .into_iter()
            .find(|c| c.spec.provisioner == SANDBOX_PROVISIONER)
            .ok_or(ResolveError::NoAvailableTargetClass {
                provisioner: SANDBOX_PROVISIONER.to_string(),
            })
    }

    async fn all_test_scenarios(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<IntegrationTestScenario>> {
        let scenarios: Vec<IntegrationTestScenario> =
            list_as(store, &application.meta.namespace, &LabelSelector::default()).await?;
        Ok(scenarios
            .into_iter()
            .filter(|s| s.spec.application == application.meta.name)
            .collect())
    }

    async fn required_test_scenarios(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<IntegrationTestScenario>> {
        let selector = LabelSelector::new().not_in(labels::SCENARIO_OPTIONAL, &["true"]);
        let scenarios: Vec<IntegrationTestScenario> =
            list_as(store, &application.meta.namespace, &selector).await?;
        Ok(scenarios
            .into_iter()
            .filter(|s| s.spec.application == application.meta.name)
            .collect())
    }

    async fn target_claim_for_environment(
        &self,
        store: &dyn ObjectStore,
        environment: &Environment,
    ) -> ResolveResult<DeploymentTargetClaim> {
        let Some(claim_name) = environment.spec.target_claim.as_deref() else {
            return Err(ResolveError::MissingReference {
                kind: Environment::KIND,
                namespace: environment.meta.namespace.clone(),
                name: environment.meta.name.clone(),
                relation: "deployment target claim",
            });
        };
        let claim = get_as(store, &environment.meta.namespace, claim_name).await?;
        Ok(claim)
    }

    async fn target_for_claim(
        &self,
        store: &dyn ObjectStore,
        claim: &DeploymentTargetClaim,
    ) -> ResolveResult<DeploymentTarget> {
        let Some(target_name) = claim.spec.target_name.as_deref() else {
            return Err(ResolveError::MissingReference {
                kind: DeploymentTargetClaim::KIND,
                namespace: claim.meta.namespace.clone(),
                name: claim.meta.name.clone(),
                relation: "deployment target",
            });
        };
        let target = get_as(store, &claim.meta.namespace, target_name).await?;
        Ok(target)
    }

    async fn find_snapshot_binding(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
        environment: &Environment,
    ) -> ResolveResult<SnapshotEnvironmentBinding> {
        let bindings: Vec<SnapshotEnvironmentBinding> =
            list_as(store, &application.meta.namespace, &LabelSelector::default()).await?;
        bindings
            .into_iter()
            .filter(|b| b.spec.environment == environment.meta.name)
            .find(|b| b.spec.application == application.meta.name)
            .ok_or_else(|| ResolveError::NoSnapshotBinding {
                application: application.meta.name.clone(),
                environment: environment.meta.name.clone(),
            })
    }

    async fn pipeline_runs_for_snapshot_and_scenario(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
        scenario: &IntegrationTestScenario,
    ) -> ResolveResult<Vec<PipelineRun>> {
        let selector = LabelSelector::new()
            .eq(labels::PIPELINE_TYPE, labels::PIPELINE_TYPE_TEST)
            .eq(labels::SNAPSHOT, &snapshot.meta.name)
            .eq(labels::SCENARIO, &scenario.meta.name);
        let runs = list_as(store, &snapshot.meta.namespace, &selector).await?;
        debug!(
            snapshot = %snapshot.meta.name,
            scenario = %scenario.meta.name,
            matched = runs.len(),
            "resolved test pipeline runs"
        );
        Ok(runs)
    }

    async fn build_pipeline_runs_for_component(
        &self,
        store: &dyn ObjectStore,
        component: &Component,
    ) -> ResolveResult<Vec<PipelineRun>> {
        let selector = LabelSelector::new()
            .eq(labels::PIPELINE_TYPE, labels::PIPELINE_TYPE_BUILD)
            .eq(labels::COMPONENT, &component.meta.name);
        let runs = list_as(store, &component.meta.namespace, &selector).await?;
        Ok(runs)
    }

    async fn all_snapshots(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<Snapshot>> {
        let snapshots: Vec<Snapshot> =
            list_as(store, &application.meta.namespace, &LabelSelector::default()).await?;
        Ok(snapshots
            .into_iter()
            .filter(|s| s.spec.application == application.meta.name)
            .collect())
    }

    async fn auto_release_plans(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<ReleasePlan>> {
        let selector = LabelSelector::new().not_in(labels::AUTO_RELEASE, &["false"]);
        let plans: Vec<ReleasePlan> =
            list_as(store, &application.meta.namespace, &selector).await?;
        Ok(plans
            .into_iter()
            .filter(|p| p.spec.application == application.meta.name)
            .collect())
    }

    async fn task_runs_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Vec<TaskRun>> {
        let mut task_runs = Vec::with_capacity(pipeline_run.status.child_references.len());
        for child in &pipeline_run.status.child_references {
            let task_run: TaskRun =
                get_as(store, &pipeline_run.meta.namespace, &child.name).await?;
            task_runs.push(task_run);
        }
        Ok(task_runs)
    }
}
