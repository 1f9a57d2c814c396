//! `start`: create a stack for a Name.

use tracing::{info, warn};

use super::{Lifecycle, StartOutcome, StartRequest};
use crate::error::Result as CfstackResult;
use crate::naming::{allocate_fresh_name, list_images, names_in_use};
use crate::provider::{
    CreateStackRequest, ImageState, KeyValues, ProviderGateway, wait_stack_created,
};
use crate::template::TemplateSource;

/// Stack parameter carrying the Name.
const NAME_PARAMETER: &str = "Name";

/// Stack parameter carrying the image to launch from.
const IMAGE_PARAMETER: &str = "ImageId";

impl<G, T> Lifecycle<'_, G, T>
where
    G: ProviderGateway + ?Sized,
    T: TemplateSource + ?Sized,
{
    /// Create a stack from a template.
    ///
    /// With a Name, the stack resumes from that Name's latest image if any
    /// exist. Without one (or with an empty one), a fresh Name is allocated
    /// from the pool, avoiding Names carried by images or live stacks.
    ///
    /// Returns once the provider accepts the request, or once the stack is
    /// created when `request.wait` is set. Nothing is rolled back on failure.
    ///
    /// # Errors
    ///
    /// - `TemplateError` if the template cannot be loaded.
    /// - `NamingError::NoNamesAvailable` if no fresh Name is free.
    /// - `ProviderError` if a lookup, the submission or the wait fails.
    pub async fn start(&self, request: &StartRequest) -> CfstackResult<StartOutcome> {
        let template = self.templates.load_template(&request.template)?;

        let (name, image_id) = self.resolve_name(request.name.as_deref()).await?;

        let mut parameters = KeyValues::new();
        if let Some(image) = &image_id {
            info!(name = %name, image_id = %image, "resuming from saved image");
            parameters.insert(IMAGE_PARAMETER.to_owned(), image.clone());
        }
        parameters.insert(NAME_PARAMETER.to_owned(), name.clone());

        info!(name = %name, template = %template.identifier, "launching stack");
        let stack_id = self
            .gateway
            .create_stack(CreateStackRequest {
                stack_name: name.clone(),
                template_body: template.body,
                parameters,
            })
            .await?;

        if request.wait {
            wait_stack_created(self.gateway, &name, self.waits).await?;
            info!(name = %name, "stack created");
        }

        Ok(StartOutcome {
            name,
            stack_id,
            image_id,
        })
    }

    /// The Name to start and the image to resume from, if any.
    async fn resolve_name(&self, given: Option<&str>) -> CfstackResult<(String, Option<String>)> {
        let Some(name) = given.filter(|candidate| !candidate.is_empty()) else {
            let in_use = names_in_use(self.gateway).await?;
            let fresh = allocate_fresh_name(self.names, &in_use, &mut rand::thread_rng())?;
            return Ok((fresh, None));
        };

        let latest = list_images(self.gateway, name).await?.pop();
        if let Some(image) = latest
            .as_ref()
            .filter(|image| image.state != ImageState::Available)
        {
            warn!(
                name,
                image_id = %image.image_id,
                state = ?image.state,
                "latest image is not available; the stack may fail to launch"
            );
        }
        Ok((name.to_owned(), latest.map(|image| image.image_id)))
    }
}
