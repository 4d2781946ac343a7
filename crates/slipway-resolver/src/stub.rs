//! Per-operation stub overlay for resolution operations
//!
//! `StubResolver` wraps any `GraphResolver` and lets a test program a
//! response for exactly the operations it cares about; every other
//! operation falls through to the wrapped resolver with the same store
//! handle. Slots are typed per operation, so the mapping from operation to
//! result shape is checked at compile time. Identity is per operation, not
//! per result type: the two Environment-returning operations have distinct
//! slots.
//!
//! Hitting an `Unprogrammed` slot panics. A reachable-but-unset stub is a
//! defect in the test, not a runtime condition a production caller could
//! encounter, so it must fail loudly rather than return a zero value.

use async_trait::async_trait;

use slipway_store::{
    Application, Component, DeploymentTarget, DeploymentTargetClaim, DeploymentTargetClass,
    Environment, IntegrationTestScenario, ObjectStore, PipelineRun, Release, ReleasePlan,
    Snapshot, SnapshotEnvironmentBinding, TaskRun,
};

use crate::error::ResolveResult;
use crate::resolver::{GraphResolver, StoreResolver};

/// Identity of a resolution operation, used in stub diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AllEnvironments,
    ReleasesForSnapshot,
    AllApplicationComponents,
    AllSnapshotComponents,
    ApplicationForSnapshot,
    ComponentForSnapshot,
    ComponentForPipelineRun,
    ApplicationForPipelineRun,
    ApplicationForComponent,
    EnvironmentForPipelineRun,
    SnapshotForPipelineRun,
    FindAvailableTargetClass,
    AllTestScenarios,
    RequiredTestScenarios,
    TargetClaimForEnvironment,
    TargetForClaim,
    FindSnapshotBinding,
    PipelineRunsForSnapshotAndScenario,
    BuildPipelineRunsForComponent,
    AllSnapshots,
    AutoReleasePlans,
    TaskRunsForPipelineRun,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::AllEnvironments => "all_environments",
            Operation::ReleasesForSnapshot => "releases_for_snapshot",
            Operation::AllApplicationComponents => "all_application_components",
            Operation::AllSnapshotComponents => "all_snapshot_components",
            Operation::ApplicationForSnapshot => "application_for_snapshot",
            Operation::ComponentForSnapshot => "component_for_snapshot",
            Operation::ComponentForPipelineRun => "component_for_pipeline_run",
            Operation::ApplicationForPipelineRun => "application_for_pipeline_run",
            Operation::ApplicationForComponent => "application_for_component",
            Operation::EnvironmentForPipelineRun => "environment_for_pipeline_run",
            Operation::SnapshotForPipelineRun => "snapshot_for_pipeline_run",
            Operation::FindAvailableTargetClass => "find_available_target_class",
            Operation::AllTestScenarios => "all_test_scenarios",
            Operation::RequiredTestScenarios => "required_test_scenarios",
            Operation::TargetClaimForEnvironment => "target_claim_for_environment",
            Operation::TargetForClaim => "target_for_claim",
            Operation::FindSnapshotBinding => "find_snapshot_binding",
            Operation::PipelineRunsForSnapshotAndScenario => {
                "pipeline_runs_for_snapshot_and_scenario"
            }
            Operation::BuildPipelineRunsForComponent => "build_pipeline_runs_for_component",
            Operation::AllSnapshots => "all_snapshots",
            Operation::AutoReleasePlans => "auto_release_plans",
            Operation::TaskRunsForPipelineRun => "task_runs_for_pipeline_run",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The stub state of one operation.
#[derive(Debug, Clone, Default)]
pub enum StubSlot<T> {
    /// No stub: delegate to the wrapped resolver.
    #[default]
    Passthrough,
    /// The operation is claimed by the test but was never given a
    /// response. Reaching it is a test-authoring defect and panics.
    Unprogrammed,
    /// Return this response without touching the store.
    Response(ResolveResult<T>),
}

impl<T: Clone> StubSlot<T> {
    /// A slot answering with `Ok(value)`.
    pub fn ok(value: T) -> Self {
        StubSlot::Response(Ok(value))
    }

    /// A slot answering with `Err(error)`.
    pub fn err(error: crate::ResolveError) -> Self {
        StubSlot::Response(Err(error))
    }

    fn respond(&self, operation: Operation) -> ResolveResult<T> {
        match self {
            StubSlot::Response(response) => response.clone(),
            StubSlot::Unprogrammed => panic!(
                "stub for operation {operation} was reached but never programmed with a response"
            ),
            // Dispatch in StubResolver never routes Passthrough here.
            StubSlot::Passthrough => panic!(
                "stub dispatch error: passthrough slot for operation {operation} asked to respond"
            ),
        }
    }
}

/// One typed slot per resolution operation. Immutable once the
/// `StubResolver` is built; programmed slots coexist without interference.
#[derive(Debug, Clone, Default)]
pub struct StubSet {
    pub all_environments: StubSlot<Vec<Environment>>,
    pub releases_for_snapshot: StubSlot<Vec<Release>>,
    pub all_application_components: StubSlot<Vec<Component>>,
    pub all_snapshot_components: StubSlot<Vec<Component>>,
    pub application_for_snapshot: StubSlot<Application>,
    pub component_for_snapshot: StubSlot<Component>,
    pub component_for_pipeline_run: StubSlot<Component>,
    pub application_for_pipeline_run: StubSlot<Application>,
    pub application_for_component: StubSlot<Application>,
    pub environment_for_pipeline_run: StubSlot<Environment>,
    pub snapshot_for_pipeline_run: StubSlot<Snapshot>,
    pub find_available_target_class: StubSlot<DeploymentTargetClass>,
    pub all_test_scenarios: StubSlot<Vec<IntegrationTestScenario>>,
    pub required_test_scenarios: StubSlot<Vec<IntegrationTestScenario>>,
    pub target_claim_for_environment: StubSlot<DeploymentTargetClaim>,
    pub target_for_claim: StubSlot<DeploymentTarget>,
    pub find_snapshot_binding: StubSlot<SnapshotEnvironmentBinding>,
    pub pipeline_runs_for_snapshot_and_scenario: StubSlot<Vec<PipelineRun>>,
    pub build_pipeline_runs_for_component: StubSlot<Vec<PipelineRun>>,
    pub all_snapshots: StubSlot<Vec<Snapshot>>,
    pub auto_release_plans: StubSlot<Vec<ReleasePlan>>,
    pub task_runs_for_pipeline_run: StubSlot<Vec<TaskRun>>,
}

impl StubSet {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A `GraphResolver` decorator answering stubbed operations from its
/// `StubSet` and delegating everything else to the wrapped resolver.
#[derive(Debug, Default)]
pub struct StubResolver<R = StoreResolver> {
    inner: R,
    stubs: StubSet,
}

impl StubResolver<StoreResolver> {
    /// Overlay the given stubs on real store resolution.
    pub fn new(stubs: StubSet) -> Self {
        Self {
            inner: StoreResolver::new(),
            stubs,
        }
    }
}

impl<R: GraphResolver> StubResolver<R> {
    /// Overlay the given stubs on an arbitrary resolver.
    pub fn wrapping(inner: R, stubs: StubSet) -> Self {
        Self { inner, stubs }
    }
}

macro_rules! dispatch {
    ($self:ident, $slot:ident, $op:expr, $delegate:expr) => {
        match &$self.stubs.$slot {
            StubSlot::Passthrough => $delegate,
            slot => slot.respond($op),
        }
    };
}

#[async_trait]
impl<R: GraphResolver> GraphResolver for StubResolver<R> {
    async fn all_environments(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<Environment>> {
        dispatch!(
            self,
            all_environments,
            Operation::AllEnvironments,
            self.inner.all_environments(store, application).await
        )
    }

    async fn releases_for_snapshot(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
    ) -> ResolveResult<Vec<Release>> {
        dispatch!(
            self,
            releases_for_snapshot,
            Operation::ReleasesForSnapshot,
            self.inner.releases_for_snapshot(store, snapshot).await
        )
    }

    async fn all_application_components(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<Component>> {
        dispatch!(
            self,
            all_application_components,
            Operation::AllApplicationComponents,
            self.inner
                .all_application_components(store, application)
                .await
        )
    }

    async fn all_snapshot_components(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
    ) -> ResolveResult<Vec<Component>> {
        dispatch!(
            self,
            all_snapshot_components,
            Operation::AllSnapshotComponents,
            self.inner.all_snapshot_components(store, snapshot).await
        )
    }

    async fn application_for_snapshot(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
    ) -> ResolveResult<Application> {
        dispatch!(
            self,
            application_for_snapshot,
            Operation::ApplicationForSnapshot,
            self.inner.application_for_snapshot(store, snapshot).await
        )
    }

    async fn component_for_snapshot(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
    ) -> ResolveResult<Component> {
        dispatch!(
            self,
            component_for_snapshot,
            Operation::ComponentForSnapshot,
            self.inner.component_for_snapshot(store, snapshot).await
        )
    }

    async fn component_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Component> {
        dispatch!(
            self,
            component_for_pipeline_run,
            Operation::ComponentForPipelineRun,
            self.inner
                .component_for_pipeline_run(store, pipeline_run)
                .await
        )
    }

    async fn application_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Application> {
        dispatch!(
            self,
            application_for_pipeline_run,
            Operation::ApplicationForPipelineRun,
            self.inner
                .application_for_pipeline_run(store, pipeline_run)
                .await
        )
    }

    async fn application_for_component(
        &self,
        store: &dyn ObjectStore,
        component: &Component,
    ) -> ResolveResult<Application> {
        dispatch!(
            self,
            application_for_component,
            Operation::ApplicationForComponent,
            self.inner.application_for_component(store, component).await
        )
    }

    async fn environment_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Environment> {
        dispatch!(
            self,
            environment_for_pipeline_run,
            Operation::EnvironmentForPipelineRun,
            self.inner
                .environment_for_pipeline_run(store, pipeline_run)
                .await
        )
    }

    async fn snapshot_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Snapshot> {
        dispatch!(
            self,
            snapshot_for_pipeline_run,
            Operation::SnapshotForPipelineRun,
            self.inner
                .snapshot_for_pipeline_run(store, pipeline_run)
                .await
        )
    }

    async fn find_available_target_class(
        &self,
        store: &dyn ObjectStore,
    ) -> ResolveResult<DeploymentTargetClass> {
        dispatch!(
            self,
            find_available_target_class,
            Operation::FindAvailableTargetClass,
            self.inner.find_available_target_class(store).await
        )
    }

    async fn all_test_scenarios(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<IntegrationTestScenario>> {
        dispatch!(
            self,
            all_test_scenarios,
            Operation::AllTestScenarios,
            self.inner.all_test_scenarios(store, application).await
        )
    }

    async fn required_test_scenarios(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<IntegrationTestScenario>> {
        dispatch!(
            self,
            required_test_scenarios,
            Operation::RequiredTestScenarios,
            self.inner.required_test_scenarios(store, application).await
        )
    }

    async fn target_claim_for_environment(
        &self,
        store: &dyn ObjectStore,
        environment: &Environment,
    ) -> ResolveResult<DeploymentTargetClaim> {
        dispatch!(
            self,
            target_claim_for_environment,
            Operation::TargetClaimForEnvironment,
            self.inner
                .target_claim_for_environment(store, environment)
                .await
        )
    }

    async fn target_for_claim(
        &self,
        store: &dyn ObjectStore,
        claim: &DeploymentTargetClaim,
    ) -> ResolveResult<DeploymentTarget> {
        dispatch!(
            self,
            target_for_claim,
            Operation::TargetForClaim,
            self.inner.target_for_claim(store, claim).await
        )
    }

    async fn find_snapshot_binding(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
        environment: &Environment,
    ) -> ResolveResult<SnapshotEnvironmentBinding> {
        dispatch!(
            self,
            find_snapshot_binding,
            Operation::FindSnapshotBinding,
            self.inner
                .find_snapshot_binding(store, application, environment)
                .await
        )
    }

    async fn pipeline_runs_for_snapshot_and_scenario(
        &self,
        store: &dyn ObjectStore,
        snapshot: &Snapshot,
        scenario: &IntegrationTestScenario,
    ) -> ResolveResult<Vec<PipelineRun>> {
        dispatch!(
            self,
            pipeline_runs_for_snapshot_and_scenario,
            Operation::PipelineRunsForSnapshotAndScenario,
            self.inner
                .pipeline_runs_for_snapshot_and_scenario(store, snapshot, scenario)
                .await
        )
    }

    async fn build_pipeline_runs_for_component(
        &self,
        store: &dyn ObjectStore,
        component: &Component,
    ) -> ResolveResult<Vec<PipelineRun>> {
        dispatch!(
            self,
            build_pipeline_runs_for_component,
            Operation::BuildPipelineRunsForComponent,
            self.inner
                .build_pipeline_runs_for_component(store, component)
                .await
        )
    }

    async fn all_snapshots(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<Snapshot>> {
        dispatch!(
            self,
            all_snapshots,
            Operation::AllSnapshots,
            self.inner.all_snapshots(store, application).await
        )
    }

    async fn auto_release_plans(
        &self,
        store: &dyn ObjectStore,
        application: &Application,
    ) -> ResolveResult<Vec<ReleasePlan>> {
        dispatch!(
            self,
            auto_release_plans,
            Operation::AutoReleasePlans,
            self.inner.auto_release_plans(store, application).await
        )
    }

    async fn task_runs_for_pipeline_run(
        &self,
        store: &dyn ObjectStore,
        pipeline_run: &PipelineRun,
    ) -> ResolveResult<Vec<TaskRun>> {
        dispatch!(
            self,
            task_runs_for_pipeline_run,
            Operation::TaskRunsForPipelineRun,
            self.inner
                .task_runs_for_pipeline_run(store, pipeline_run)
                .await
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn programmed_slot_clones_its_response() {
        let slot = StubSlot::ok(vec![Environment::default()]);
        let first = slot.respond(Operation::AllEnvironments).unwrap();
        let second = slot.respond(Operation::AllEnvironments).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "never programmed")]
    fn unprogrammed_slot_panics_with_operation_name() {
        let slot: StubSlot<Application> = StubSlot::Unprogrammed;
        let _ = slot.respond(Operation::ApplicationForSnapshot);
    }
}
