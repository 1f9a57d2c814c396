//! Provider gateway: the narrow interface onto the compute and
//! stack-orchestration APIs.
//!
//! The lifecycle workflow never talks to the SDK directly. It goes through
//! [`ProviderGateway`], which [`AwsGateway`] implements on top of the EC2 and
//! CloudFormation clients and which tests replace with mocks or in-memory
//! fakes. Resources come back as small owned records ([`InstanceRef`],
//! [`ImageRef`], ...) carrying their tags as [`KeyValues`], so nothing outside
//! this module depends on SDK types.
//!
//! Blocking waits on asynchronous provider operations are bounded polling
//! loops built on the gateway's state queries; see [`wait`].

mod aws;
#[cfg(test)]
pub(crate) mod mock;
pub mod shape;
pub mod wait;

use std::future::Future;
use std::pin::Pin;

pub use aws::{AwsGateway, RegionResolver};
pub use shape::KeyValues;
pub use wait::{WaitPolicy, wait_image_available, wait_stack_created, wait_stack_deleted};

use crate::error::ProviderError;

/// Boxed future type returned by [`ProviderGateway`] implementors.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Milliseconds since the Unix epoch, as reported by the provider.
pub type EpochMillis = i64;

/// A compute instance as returned by a tag query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    /// Provider instance identifier.
    pub instance_id: String,
    /// Launch time, when reported.
    pub launched_at: Option<EpochMillis>,
    /// Lifecycle state name, e.g. `running` or `terminated`.
    pub state: Option<String>,
    /// Tags attached to the instance.
    pub tags: KeyValues,
}

impl InstanceRef {
    /// Returns whether the instance still counts as live for a Name.
    ///
    /// Instances that are shutting down or already terminated linger in
    /// describe results for a while but can no longer be imaged.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !matches!(
            self.state.as_deref(),
            Some("shutting-down" | "terminated")
        )
    }
}

/// Image availability as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    /// Still being created.
    Pending,
    /// Ready to launch instances from.
    Available,
    /// Creation ended without a usable image.
    Failed(String),
}

/// A machine image owned by the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Provider image identifier.
    pub image_id: String,
    /// Creation time, when reported.
    pub created_at: Option<EpochMillis>,
    /// Current state.
    pub state: ImageState,
    /// Tags attached to the image.
    pub tags: KeyValues,
}

/// A volume or snapshot: anything only listed by its tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedResource {
    /// Provider resource identifier.
    pub id: String,
    /// Creation or start time, when reported.
    pub created_at: Option<EpochMillis>,
    /// Tags attached to the resource.
    pub tags: KeyValues,
}

/// A live stack as returned by the stack listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSummary {
    /// Stack name.
    pub name: String,
    /// Creation time, when reported.
    pub created_at: Option<EpochMillis>,
}

/// Stack lifecycle state, reduced to what the waits need to distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackState {
    /// An operation is still running; carries the raw status.
    InProgress(String),
    /// Creation finished successfully.
    CreateComplete,
    /// Deletion finished.
    DeleteComplete,
    /// A create, delete or rollback failed; carries the raw status.
    Failed(String),
}

/// Stack creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStackRequest {
    /// Stack name; always equal to the Name being started.
    pub stack_name: String,
    /// Serialised template document.
    pub template_body: String,
    /// Template parameters, e.g. `Name` and `ImageId`.
    pub parameters: KeyValues,
}

/// Image creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateImageRequest {
    /// Instance to image.
    pub instance_id: String,
    /// Provider-side image name.
    pub image_name: String,
    /// Tags applied to both the image and its backing snapshot.
    pub tags: KeyValues,
}

/// Behaviour required from the cloud provider.
///
/// This abstraction keeps the lifecycle workflow testable without a provider
/// account. Methods take owned arguments so returned futures only borrow the
/// gateway itself.
pub trait ProviderGateway {
    /// Submit a stack creation and return the new stack's identifier.
    fn create_stack(&self, request: CreateStackRequest) -> ProviderFuture<'_, String>;

    /// Request deletion of the named stack. Deleting an absent stack succeeds.
    fn delete_stack(&self, stack_name: String) -> ProviderFuture<'_, ()>;

    /// List live (`CREATE_COMPLETE`) stacks.
    fn list_stacks(&self) -> ProviderFuture<'_, Vec<StackSummary>>;

    /// Current state of the named stack, or `None` once it no longer exists.
    fn stack_state(&self, stack_name: String) -> ProviderFuture<'_, Option<StackState>>;

    /// Instances matching every filter.
    fn describe_instances(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<InstanceRef>>;

    /// Account-owned images matching every filter.
    fn describe_images(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<ImageRef>>;

    /// Volumes matching every filter.
    fn describe_volumes(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<TaggedResource>>;

    /// Account-owned snapshots matching every filter.
    fn describe_snapshots(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<TaggedResource>>;

    /// Public addresses of allocated elastic IPs.
    fn describe_addresses(&self) -> ProviderFuture<'_, Vec<String>>;

    /// Start image creation and return the new image identifier.
    fn create_image(&self, request: CreateImageRequest) -> ProviderFuture<'_, String>;

    /// Deregister an image.
    fn deregister_image(&self, image_id: String) -> ProviderFuture<'_, ()>;

    /// Current state of an image, or `None` if the provider does not (yet)
    /// list it.
    fn image_state(&self, image_id: String) -> ProviderFuture<'_, Option<ImageState>>;
}
