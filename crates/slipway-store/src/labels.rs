//! Label and annotation contracts for the delivery graph
//!
//! The store enforces no foreign keys: every relationship between objects is
//! carried by the label keys below. These constants are the authoritative
//! list of keys this crate reads; collaborating controllers own the writes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Application identity carried on child objects.
pub const APPLICATION: &str = "slipway.io/application";

/// Component identity carried on Snapshots and PipelineRuns.
pub const COMPONENT: &str = "slipway.io/component";

/// Snapshot identity carried on PipelineRuns and bindings.
pub const SNAPSHOT: &str = "slipway.io/snapshot";

/// Environment identity carried on PipelineRuns.
pub const ENVIRONMENT: &str = "slipway.io/environment";

/// Test scenario identity carried on PipelineRuns and bindings.
pub const SCENARIO: &str = "test.slipway.io/scenario";

/// Scenario optionality flag: `"true"` marks a scenario as optional.
/// An absent label means the scenario is required.
pub const SCENARIO_OPTIONAL: &str = "test.slipway.io/optional";

/// Auto-release opt-out flag on ReleasePlans: only the exact value
/// `"false"` opts a plan out. An absent label opts in (absence != false).
pub const AUTO_RELEASE: &str = "release.slipway.io/auto-release";

/// Pipeline run type: `"build"` or `"test"`.
pub const PIPELINE_TYPE: &str = "pipelines.slipway.io/type";

pub const PIPELINE_TYPE_BUILD: &str = "build";
pub const PIPELINE_TYPE_TEST: &str = "test";

/// Installation identifier annotation. Read but never interpreted here.
pub const ANNOTATION_INSTALLATION_ID: &str = "pac.slipway.io/installation-id";

/// On-success component update flag. Read but never interpreted here.
pub const ANNOTATION_UPDATE_COMPONENT: &str = "slipway.io/update-component-on-success";

/// A single selector requirement. Requirements in a selector are ANDed.
///
/// Usually built through [`LabelSelector::eq`] / [`LabelSelector::not_in`];
/// constructing requirements directly and assembling them with
/// [`LabelSelector::from_requirements`] is equally supported, e.g. when a
/// selector is decoded from a fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    /// The label must be present with exactly this value.
    Eq { key: String, value: String },
    /// The label is absent, or present with a value outside this set.
    NotIn { key: String, values: Vec<String> },
}

/// A conjunction of label requirements.
///
/// `LabelSelector::default()` has no requirements and matches every object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selector from explicit requirements.
    pub fn from_requirements(requirements: Vec<Requirement>) -> Self {
        Self { requirements }
    }

    /// Require `key == value`.
    pub fn eq(mut self, key: &str, value: &str) -> Self {
        self.requirements.push(Requirement::Eq {
            key: key.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Require `key` to be absent or to hold a value outside `values`.
    pub fn not_in(mut self, key: &str, values: &[&str]) -> Self {
        self.requirements.push(Requirement::NotIn {
            key: key.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    /// Whether the given label set satisfies every requirement.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|req| match req {
            Requirement::Eq { key, value } => labels.get(key) == Some(value),
            Requirement::NotIn { key, values } => match labels.get(key) {
                Some(v) => !values.contains(v),
                None => true,
            },
        })
    }
}
