//! Scenario state for lifecycle behavioural tests.

use std::sync::Arc;

use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

use super::fake::FakeCloud;

/// Outcome of the last workflow invocation.
#[derive(Debug, Clone)]
pub(crate) enum WorkflowResult {
    /// The workflow returned successfully.
    Ok,
    /// The workflow failed with this message.
    Err(String),
}

#[derive(Default, ScenarioState)]
pub(crate) struct LifecycleState {
    pub(crate) cloud: Slot<Arc<FakeCloud>>,
    pub(crate) candidates: Slot<Vec<String>>,
    pub(crate) saved_image: Slot<String>,
    pub(crate) result: Slot<WorkflowResult>,
}

#[fixture]
pub(crate) fn lifecycle_state() -> LifecycleState {
    let state = LifecycleState::default();
    state.cloud.set(Arc::new(FakeCloud::default()));
    state.candidates.set(vec![
        String::from("falcon"),
        String::from("heron"),
        String::from("osprey"),
    ]);
    state
}
