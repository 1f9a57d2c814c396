//! Given/when steps for lifecycle scenarios.

use std::sync::Arc;
use std::time::Duration;

use cfstack::lifecycle::{Lifecycle, StartRequest};
use cfstack::naming::NamePool;
use cfstack::provider::WaitPolicy;
use rstest_bdd_macros::{given, when};

use super::StepResult;
use super::fake::{FakeCloud, WebTemplate};
use super::state::{LifecycleState, WorkflowResult};

/// One workflow call.
enum Invocation {
    Start(StartRequest),
    Stop(String),
    Terminate(String),
}

fn cloud(lifecycle_state: &LifecycleState) -> StepResult<Arc<FakeCloud>> {
    lifecycle_state
        .cloud
        .get()
        .ok_or_else(|| String::from("cloud should be configured"))
}

/// Run a workflow against the scenario's cloud and record its outcome.
fn invoke(lifecycle_state: &LifecycleState, invocation: Invocation) -> StepResult<()> {
    let provider = cloud(lifecycle_state)?;
    let names = NamePool::from_names(lifecycle_state.candidates.get().unwrap_or_default())
        .map_err(|e| format!("candidate names should be valid: {e}"))?;
    let waits = WaitPolicy {
        timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(1),
    };
    let runtime =
        tokio::runtime::Runtime::new().map_err(|e| format!("failed to create runtime: {e}"))?;

    let lifecycle = Lifecycle::new(provider.as_ref(), &WebTemplate, &names, waits);
    let result = runtime.block_on(async {
        match invocation {
            Invocation::Start(request) => lifecycle.start(&request).await.map(|_| None),
            Invocation::Stop(name) => lifecycle.stop(&name).await.map(|outcome| outcome.image_id),
            Invocation::Terminate(name) => lifecycle.terminate(&name).await.map(|_| None),
        }
    });

    match result {
        Ok(saved) => {
            if let Some(image_id) = saved {
                lifecycle_state.saved_image.set(image_id);
            }
            lifecycle_state.result.set(WorkflowResult::Ok);
        }
        Err(e) => lifecycle_state.result.set(WorkflowResult::Err(e.to_string())),
    }
    Ok(())
}

#[given("an empty cloud")]
fn given_empty_cloud(lifecycle_state: &LifecycleState) {
    lifecycle_state.cloud.set(Arc::new(FakeCloud::default()));
}

#[given("saved images {first} and {second} for {name}")]
fn given_saved_images(
    lifecycle_state: &LifecycleState,
    first: String,
    second: String,
    name: String,
) -> StepResult<()> {
    let provider = cloud(lifecycle_state)?;
    provider.seed_image(&first, &name);
    provider.seed_image(&second, &name);
    Ok(())
}

#[given("the candidate names are {names}")]
fn given_candidate_names(lifecycle_state: &LifecycleState, names: String) {
    lifecycle_state
        .candidates
        .set(names.split(',').map(|name| name.trim().to_owned()).collect());
}

#[given("a running stack {name}")]
fn given_running_stack(lifecycle_state: &LifecycleState, name: String) -> StepResult<()> {
    cloud(lifecycle_state)?.seed_stack(&name, true);
    Ok(())
}

#[given("a stack {name} without an instance")]
fn given_stack_without_instance(lifecycle_state: &LifecycleState, name: String) -> StepResult<()> {
    cloud(lifecycle_state)?.seed_stack(&name, false);
    Ok(())
}

#[given("new images fail")]
fn given_new_images_fail(lifecycle_state: &LifecycleState) -> StepResult<()> {
    cloud(lifecycle_state)?.fail_new_images("failed");
    Ok(())
}

#[when("start is invoked with template {template} and name {name}")]
fn when_start_named(
    lifecycle_state: &LifecycleState,
    template: String,
    name: String,
) -> StepResult<()> {
    invoke(
        lifecycle_state,
        Invocation::Start(StartRequest {
            template,
            name: Some(name),
            wait: false,
        }),
    )
}

#[when("start is invoked with template {template} and no name")]
fn when_start_unnamed(lifecycle_state: &LifecycleState, template: String) -> StepResult<()> {
    invoke(
        lifecycle_state,
        Invocation::Start(StartRequest {
            template,
            name: None,
            wait: false,
        }),
    )
}

#[when("stop is invoked for {name}")]
fn when_stop(lifecycle_state: &LifecycleState, name: String) -> StepResult<()> {
    invoke(lifecycle_state, Invocation::Stop(name))
}

#[when("terminate is invoked for {name}")]
fn when_terminate(lifecycle_state: &LifecycleState, name: String) -> StepResult<()> {
    invoke(lifecycle_state, Invocation::Terminate(name))
}
