//! In-memory cloud standing in for the provider in lifecycle scenarios.
//!
//! Stacks launch one tagged instance each; deleting a stack terminates its
//! instances. Images become available immediately unless the scenario asks
//! them to fail.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use camino::Utf8PathBuf;
use cfstack::error::{ProviderError, TemplateError};
use cfstack::provider::{
    CreateImageRequest, CreateStackRequest, ImageRef, ImageState, InstanceRef, KeyValues,
    ProviderFuture, ProviderGateway, StackState, StackSummary, TaggedResource,
};
use cfstack::template::{TemplateDocument, TemplateSource};

/// Mutating calls, in the order they were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CloudCall {
    CreateStack(CreateStackRequest),
    DeleteStack(String),
    CreateImage(CreateImageRequest),
    DeregisterImage(String),
}

#[derive(Debug)]
struct CloudState {
    clock: i64,
    next_id: u32,
    stacks: BTreeMap<String, i64>,
    instances: Vec<InstanceRef>,
    images: Vec<ImageRef>,
    new_image_state: ImageState,
    calls: Vec<CloudCall>,
}

impl Default for CloudState {
    fn default() -> Self {
        Self {
            clock: 0,
            next_id: 100,
            stacks: BTreeMap::new(),
            instances: Vec::new(),
            images: Vec::new(),
            new_image_state: ImageState::Available,
            calls: Vec::new(),
        }
    }
}

impl CloudState {
    fn tick(&mut self) -> i64 {
        self.clock += 1_000;
        self.clock
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn launch_instance(&mut self, name: &str) {
        let launched_at = self.tick();
        let instance_id = self.fresh_id("i");
        self.instances.push(InstanceRef {
            instance_id,
            launched_at: Some(launched_at),
            state: Some(String::from("running")),
            tags: name_tags(name),
        });
    }
}

fn name_tags(name: &str) -> KeyValues {
    KeyValues::from([(String::from("Name"), String::from(name))])
}

/// Whether `tags` and `state` satisfy every filter entry.
fn matches(filters: &KeyValues, tags: &KeyValues, state: Option<&str>) -> bool {
    filters.iter().all(|(key, value)| {
        if let Some(tag) = key.strip_prefix("tag:") {
            tags.get(tag) == Some(value)
        } else if key.replace('_', "-") == "instance-state-name" {
            state == Some(value.as_str())
        } else {
            false
        }
    })
}

/// Thread-safe in-memory provider.
#[derive(Debug, Default)]
pub(crate) struct FakeCloud {
    state: Mutex<CloudState>,
}

impl FakeCloud {
    fn lock(&self) -> MutexGuard<'_, CloudState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a live stack, optionally with its running instance.
    pub(crate) fn seed_stack(&self, name: &str, with_instance: bool) {
        let mut state = self.lock();
        let created_at = state.tick();
        state.stacks.insert(String::from(name), created_at);
        if with_instance {
            state.launch_instance(name);
        }
    }

    /// Add an available image tagged with `name`.
    pub(crate) fn seed_image(&self, image_id: &str, name: &str) {
        let mut state = self.lock();
        let created_at = state.tick();
        state.images.push(ImageRef {
            image_id: String::from(image_id),
            created_at: Some(created_at),
            state: ImageState::Available,
            tags: name_tags(name),
        });
    }

    /// Images created from now on report `state` instead of becoming
    /// available.
    pub(crate) fn fail_new_images(&self, state: &str) {
        self.lock().new_image_state = ImageState::Failed(String::from(state));
    }

    pub(crate) fn calls(&self) -> Vec<CloudCall> {
        self.lock().calls.clone()
    }

    pub(crate) fn image_ids(&self, name: &str) -> Vec<String> {
        self.lock()
            .images
            .iter()
            .filter(|image| image.tags.get("Name").map(String::as_str) == Some(name))
            .map(|image| image.image_id.clone())
            .collect()
    }

    pub(crate) fn has_stack(&self, name: &str) -> bool {
        self.lock().stacks.contains_key(name)
    }

    /// The most recent creation request for stack `name`.
    pub(crate) fn last_created(&self, name: &str) -> Option<CreateStackRequest> {
        self.lock().calls.iter().rev().find_map(|call| match call {
            CloudCall::CreateStack(request) if request.stack_name == name => Some(request.clone()),
            _ => None,
        })
    }
}

fn ready<'a, T: Send + 'a>(result: Result<T, ProviderError>) -> ProviderFuture<'a, T> {
    Box::pin(async move { result })
}

impl ProviderGateway for FakeCloud {
    fn create_stack(&self, request: CreateStackRequest) -> ProviderFuture<'_, String> {
        let mut state = self.lock();
        state.calls.push(CloudCall::CreateStack(request.clone()));
        if state.stacks.contains_key(&request.stack_name) {
            return ready(Err(ProviderError::RequestFailed {
                operation: "CreateStack",
                message: format!("Stack [{}] already exists", request.stack_name),
            }));
        }
        let created_at = state.tick();
        state.stacks.insert(request.stack_name.clone(), created_at);
        state.launch_instance(&request.stack_name);
        ready(Ok(format!("stack/{}", request.stack_name)))
    }

    fn delete_stack(&self, stack_name: String) -> ProviderFuture<'_, ()> {
        let mut state = self.lock();
        state.stacks.remove(&stack_name);
        for instance in &mut state.instances {
            if instance.tags.get("Name") == Some(&stack_name) {
                instance.state = Some(String::from("terminated"));
            }
        }
        state.calls.push(CloudCall::DeleteStack(stack_name));
        ready(Ok(()))
    }

    fn list_stacks(&self) -> ProviderFuture<'_, Vec<StackSummary>> {
        let stacks = self
            .lock()
            .stacks
            .iter()
            .map(|(name, created_at)| StackSummary {
                name: name.clone(),
                created_at: Some(*created_at),
            })
            .collect();
        ready(Ok(stacks))
    }

    fn stack_state(&self, stack_name: String) -> ProviderFuture<'_, Option<StackState>> {
        let live = self.lock().stacks.contains_key(&stack_name);
        ready(Ok(live.then_some(StackState::CreateComplete)))
    }

    fn describe_instances(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<InstanceRef>> {
        let found = self
            .lock()
            .instances
            .iter()
            .filter(|i| matches(&filters, &i.tags, i.state.as_deref()))
            .cloned()
            .collect();
        ready(Ok(found))
    }

    fn describe_images(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<ImageRef>> {
        let found = self
            .lock()
            .images
            .iter()
            .filter(|i| matches(&filters, &i.tags, None))
            .cloned()
            .collect();
        ready(Ok(found))
    }

    fn describe_volumes(&self, _filters: KeyValues) -> ProviderFuture<'_, Vec<TaggedResource>> {
        ready(Ok(Vec::new()))
    }

    fn describe_snapshots(&self, _filters: KeyValues) -> ProviderFuture<'_, Vec<TaggedResource>> {
        ready(Ok(Vec::new()))
    }

    fn describe_addresses(&self) -> ProviderFuture<'_, Vec<String>> {
        ready(Ok(Vec::new()))
    }

    fn create_image(&self, request: CreateImageRequest) -> ProviderFuture<'_, String> {
        let mut state = self.lock();
        let created_at = state.tick();
        let image_id = state.fresh_id("ami");
        let image_state = state.new_image_state.clone();
        state.images.push(ImageRef {
            image_id: image_id.clone(),
            created_at: Some(created_at),
            state: image_state,
            tags: request.tags.clone(),
        });
        state.calls.push(CloudCall::CreateImage(request));
        ready(Ok(image_id))
    }

    fn deregister_image(&self, image_id: String) -> ProviderFuture<'_, ()> {
        let mut state = self.lock();
        state.images.retain(|image| image.image_id != image_id);
        state.calls.push(CloudCall::DeregisterImage(image_id));
        ready(Ok(()))
    }

    fn image_state(&self, image_id: String) -> ProviderFuture<'_, Option<ImageState>> {
        let found = self
            .lock()
            .images
            .iter()
            .find(|image| image.image_id == image_id)
            .map(|image| image.state.clone());
        ready(Ok(found))
    }
}

/// Serves a minimal template for `web` only.
#[derive(Debug, Default)]
pub(crate) struct WebTemplate;

impl TemplateSource for WebTemplate {
    fn load_template(&self, identifier: &str) -> Result<TemplateDocument, TemplateError> {
        let path = Utf8PathBuf::from(format!("templates/{identifier}.yaml"));
        if identifier != "web" {
            return Err(TemplateError::NotFound {
                identifier: identifier.to_owned(),
                path,
            });
        }
        Ok(TemplateDocument {
            identifier: identifier.to_owned(),
            path,
            body: String::from("Resources: {}\n"),
        })
    }
}
