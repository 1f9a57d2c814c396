//! [`ProviderGateway`] implementation over the AWS EC2 and CloudFormation
//! SDK clients.
//!
//! Requests are built from [`KeyValues`] through [`shape`](super::shape);
//! responses are reduced to the owned records defined in the parent module.
//! Every SDK error becomes [`ProviderError::RequestFailed`] naming the
//! operation, except the "does not exist" answers the state queries treat
//! as absence.

mod region;

pub use region::RegionResolver;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::types::StackStatus;
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_ec2::primitives::{DateTime, DateTimeFormat};
use aws_sdk_ec2::types::{ResourceType, TagSpecification};
use tracing::debug;

use super::shape;
use super::{
    CreateImageRequest, CreateStackRequest, EpochMillis, ImageRef, ImageState, InstanceRef,
    KeyValues, ProviderFuture, ProviderGateway, StackState, StackSummary, TaggedResource,
};
use crate::error::ProviderError;

/// Owner filter restricting images and snapshots to the caller's account.
const SELF_OWNER: &str = "self";

/// Error code EC2 returns while a freshly created image is not yet visible.
const IMAGE_NOT_FOUND_CODE: &str = "InvalidAMIID.NotFound";

/// Message fragment CloudFormation returns for an unknown stack name.
const STACK_MISSING_MESSAGE: &str = "does not exist";

/// Gateway backed by the AWS SDK.
///
/// Constructed once at startup and passed by reference to the lifecycle
/// workflow; there is no global client.
#[derive(Debug, Clone)]
pub struct AwsGateway {
    ec2: aws_sdk_ec2::Client,
    cloudformation: aws_sdk_cloudformation::Client,
}

impl AwsGateway {
    /// Wraps existing SDK clients.
    #[must_use]
    pub const fn new(
        ec2: aws_sdk_ec2::Client,
        cloudformation: aws_sdk_cloudformation::Client,
    ) -> Self {
        Self {
            ec2,
            cloudformation,
        }
    }

    /// Builds clients from the SDK's shared configuration.
    ///
    /// `region` and `profile` override the SDK defaults when given.
    /// Credentials are resolved lazily on the first request.
    pub async fn connect(region: Option<&str>, profile: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(name) = region {
            loader = loader.region(Region::new(name.to_owned()));
        }
        if let Some(name) = profile {
            loader = loader.profile_name(name);
        }
        let shared = loader.load().await;
        debug!(region = ?shared.region(), "loaded provider configuration");

        Self::new(
            aws_sdk_ec2::Client::new(&shared),
            aws_sdk_cloudformation::Client::new(&shared),
        )
    }

    /// Builds clients using the configured region, falling back to the
    /// environment (`AWS_REGION`, `AWS_DEFAULT_REGION`).
    pub async fn connect_with_fallback<E: mockable::Env>(
        config_region: Option<&str>,
        profile: Option<&str>,
        resolver: &RegionResolver<'_, E>,
    ) -> Self {
        let region = resolver.resolve(config_region);
        Self::connect(region.as_deref(), profile).await
    }

    async fn fetch_instances(&self, filters: KeyValues) -> Result<Vec<InstanceRef>, ProviderError> {
        let mut instances = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .ec2
                .describe_instances()
                .set_filters(Some(shape::filters(&filters)))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| request_failed("DescribeInstances", e))?;

            instances.extend(
                output
                    .reservations()
                    .iter()
                    .flat_map(|reservation| reservation.instances())
                    .filter_map(|instance| {
                        Some(InstanceRef {
                            instance_id: instance.instance_id()?.to_owned(),
                            launched_at: epoch_millis(instance.launch_time()),
                            state: instance
                                .state()
                                .and_then(|state| state.name())
                                .map(|name| name.as_str().to_owned()),
                            tags: shape::tags_to_map(instance.tags()),
                        })
                    }),
            );

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => return Ok(instances),
            }
        }
    }

    async fn fetch_images(&self, filters: KeyValues) -> Result<Vec<ImageRef>, ProviderError> {
        let mut images = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .ec2
                .describe_images()
                .owners(SELF_OWNER)
                .set_filters(Some(shape::filters(&filters)))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| request_failed("DescribeImages", e))?;

            images.extend(output.images().iter().filter_map(|image| {
                Some(ImageRef {
                    image_id: image.image_id()?.to_owned(),
                    created_at: parse_creation_date(image.creation_date()),
                    state: image_state(image.state().map(aws_sdk_ec2::types::ImageState::as_str)),
                    tags: shape::tags_to_map(image.tags()),
                })
            }));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => return Ok(images),
            }
        }
    }

    async fn fetch_volumes(&self, filters: KeyValues) -> Result<Vec<TaggedResource>, ProviderError> {
        let mut volumes = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .ec2
                .describe_volumes()
                .set_filters(Some(shape::filters(&filters)))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| request_failed("DescribeVolumes", e))?;

            volumes.extend(output.volumes().iter().filter_map(|volume| {
                Some(TaggedResource {
                    id: volume.volume_id()?.to_owned(),
                    created_at: epoch_millis(volume.create_time()),
                    tags: shape::tags_to_map(volume.tags()),
                })
            }));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => return Ok(volumes),
            }
        }
    }

    async fn fetch_snapshots(
        &self,
        filters: KeyValues,
    ) -> Result<Vec<TaggedResource>, ProviderError> {
        let mut snapshots = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .ec2
                .describe_snapshots()
                .owner_ids(SELF_OWNER)
                .set_filters(Some(shape::filters(&filters)))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| request_failed("DescribeSnapshots", e))?;

            snapshots.extend(output.snapshots().iter().filter_map(|snapshot| {
                Some(TaggedResource {
                    id: snapshot.snapshot_id()?.to_owned(),
                    created_at: epoch_millis(snapshot.start_time()),
                    tags: shape::tags_to_map(snapshot.tags()),
                })
            }));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => return Ok(snapshots),
            }
        }
    }

    async fn fetch_stacks(&self) -> Result<Vec<StackSummary>, ProviderError> {
        let mut stacks = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .cloudformation
                .list_stacks()
                .stack_status_filter(StackStatus::CreateComplete)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| request_failed("ListStacks", e))?;

            stacks.extend(output.stack_summaries().iter().filter_map(|summary| {
                Some(StackSummary {
                    name: summary.stack_name()?.to_owned(),
                    created_at: epoch_millis(summary.creation_time()),
                })
            }));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => return Ok(stacks),
            }
        }
    }

    async fn fetch_stack_state(&self, stack_name: String) -> Result<Option<StackState>, ProviderError> {
        let output = match self
            .cloudformation
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
        {
            Ok(output) => output,
            Err(error)
                if error
                    .as_service_error()
                    .and_then(ProvideErrorMetadata::message)
                    .is_some_and(|message| message.contains(STACK_MISSING_MESSAGE)) =>
            {
                return Ok(None);
            }
            Err(error) => return Err(request_failed("DescribeStacks", error)),
        };

        Ok(output.stacks().first().map(|stack| {
            stack_state(
                stack
                    .stack_status()
                    .map_or("UNKNOWN", StackStatus::as_str),
            )
        }))
    }

    async fn fetch_image_state(&self, image_id: String) -> Result<Option<ImageState>, ProviderError> {
        let output = match self.ec2.describe_images().image_ids(image_id).send().await {
            Ok(output) => output,
            Err(error)
                if error
                    .as_service_error()
                    .and_then(ProvideErrorMetadata::code)
                    == Some(IMAGE_NOT_FOUND_CODE) =>
            {
                return Ok(None);
            }
            Err(error) => return Err(request_failed("DescribeImages", error)),
        };

        Ok(output.images().first().map(|image| {
            image_state(image.state().map(aws_sdk_ec2::types::ImageState::as_str))
        }))
    }

    async fn submit_image(&self, request: CreateImageRequest) -> Result<String, ProviderError> {
        let tag_specification = |resource_type: ResourceType| {
            TagSpecification::builder()
                .resource_type(resource_type)
                .set_tags(Some(shape::tags(&request.tags)))
                .build()
        };

        let output = self
            .ec2
            .create_image()
            .instance_id(&request.instance_id)
            .name(&request.image_name)
            .tag_specifications(tag_specification(ResourceType::Image))
            .tag_specifications(tag_specification(ResourceType::Snapshot))
            .send()
            .await
            .map_err(|e| request_failed("CreateImage", e))?;

        output
            .image_id()
            .map(str::to_owned)
            .ok_or(ProviderError::MissingField {
                operation: "CreateImage",
                field: "ImageId",
            })
    }

    async fn submit_stack(&self, request: CreateStackRequest) -> Result<String, ProviderError> {
        let output = self
            .cloudformation
            .create_stack()
            .stack_name(request.stack_name)
            .template_body(request.template_body)
            .set_parameters(Some(shape::parameters(&request.parameters)))
            .send()
            .await
            .map_err(|e| request_failed("CreateStack", e))?;

        output
            .stack_id()
            .map(str::to_owned)
            .ok_or(ProviderError::MissingField {
                operation: "CreateStack",
                field: "StackId",
            })
    }
}

impl ProviderGateway for AwsGateway {
    fn create_stack(&self, request: CreateStackRequest) -> ProviderFuture<'_, String> {
        Box::pin(self.submit_stack(request))
    }

    fn delete_stack(&self, stack_name: String) -> ProviderFuture<'_, ()> {
        Box::pin(async move {
            self.cloudformation
                .delete_stack()
                .stack_name(stack_name)
                .send()
                .await
                .map_err(|e| request_failed("DeleteStack", e))?;
            Ok(())
        })
    }

    fn list_stacks(&self) -> ProviderFuture<'_, Vec<StackSummary>> {
        Box::pin(self.fetch_stacks())
    }

    fn stack_state(&self, stack_name: String) -> ProviderFuture<'_, Option<StackState>> {
        Box::pin(self.fetch_stack_state(stack_name))
    }

    fn describe_instances(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<InstanceRef>> {
        Box::pin(self.fetch_instances(filters))
    }

    fn describe_images(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<ImageRef>> {
        Box::pin(self.fetch_images(filters))
    }

    fn describe_volumes(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<TaggedResource>> {
        Box::pin(self.fetch_volumes(filters))
    }

    fn describe_snapshots(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<TaggedResource>> {
        Box::pin(self.fetch_snapshots(filters))
    }

    fn describe_addresses(&self) -> ProviderFuture<'_, Vec<String>> {
        Box::pin(async move {
            let output = self
                .ec2
                .describe_addresses()
                .send()
                .await
                .map_err(|e| request_failed("DescribeAddresses", e))?;
            Ok(output
                .addresses()
                .iter()
                .filter_map(|address| address.public_ip().map(str::to_owned))
                .collect())
        })
    }

    fn create_image(&self, request: CreateImageRequest) -> ProviderFuture<'_, String> {
        Box::pin(self.submit_image(request))
    }

    fn deregister_image(&self, image_id: String) -> ProviderFuture<'_, ()> {
        Box::pin(async move {
            self.ec2
                .deregister_image()
                .image_id(image_id)
                .send()
                .await
                .map_err(|e| request_failed("DeregisterImage", e))?;
            Ok(())
        })
    }

    fn image_state(&self, image_id: String) -> ProviderFuture<'_, Option<ImageState>> {
        Box::pin(self.fetch_image_state(image_id))
    }
}

/// Wrap an SDK error, keeping its full source chain in the message.
fn request_failed<E: std::error::Error>(operation: &'static str, error: E) -> ProviderError {
    ProviderError::RequestFailed {
        operation,
        message: DisplayErrorContext(error).to_string(),
    }
}

fn epoch_millis(time: Option<&DateTime>) -> Option<EpochMillis> {
    time.and_then(|t| t.to_millis().ok())
}

/// Image creation dates arrive as ISO-8601 strings rather than timestamps.
fn parse_creation_date(date: Option<&str>) -> Option<EpochMillis> {
    date.and_then(|d| DateTime::from_str(d, DateTimeFormat::DateTime).ok())
        .and_then(|t| t.to_millis().ok())
}

fn image_state(state: Option<&str>) -> ImageState {
    match state {
        Some("available") => ImageState::Available,
        Some(failed @ ("failed" | "error" | "invalid" | "deregistered" | "disabled")) => {
            ImageState::Failed(failed.to_owned())
        }
        _ => ImageState::Pending,
    }
}

fn stack_state(status: &str) -> StackState {
    match status {
        "CREATE_COMPLETE" => StackState::CreateComplete,
        "DELETE_COMPLETE" => StackState::DeleteComplete,
        "ROLLBACK_COMPLETE" => StackState::Failed(status.to_owned()),
        failed if failed.ends_with("_FAILED") => StackState::Failed(failed.to_owned()),
        other => StackState::InProgress(other.to_owned()),
    }
}
