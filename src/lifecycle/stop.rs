//! `stop`: save the Name's instance as an image, then delete its stack.

use tracing::{info, warn};

use super::{Lifecycle, StopOutcome};
use crate::error::Result as CfstackResult;
use crate::naming::{find_instance, list_images};
use crate::provider::shape::{self, NAME_TAG};
use crate::provider::{CreateImageRequest, ProviderGateway, wait_image_available, wait_stack_deleted};
use crate::template::TemplateSource;

/// Lower-case tag duplicating `Name`, used as a search shortcut.
const SEARCH_TAG: &str = "name";

impl<G, T> Lifecycle<'_, G, T>
where
    G: ProviderGateway + ?Sized,
    T: TemplateSource + ?Sized,
{
    /// Image the Name's instance, prune older images and delete the stack.
    ///
    /// 1. Find the instance. If there is none, warn and skip to step 4.
    /// 2. Create an image named `"<name> <instance id>"`, tagged with the
    ///    Name on both the image and its snapshot, and wait until it is
    ///    available.
    /// 3. Deregister every other image tagged with the Name.
    /// 4. Delete the stack and wait until it is gone.
    ///
    /// A failed image wait aborts before step 4, so the stack is never
    /// deleted without a saved image.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if any call or wait fails.
    pub async fn stop(&self, name: &str) -> CfstackResult<StopOutcome> {
        let (image_id, pruned) = self.save_instance(name).await?;

        info!(name, "removing stack");
        self.gateway.delete_stack(name.to_owned()).await?;
        wait_stack_deleted(self.gateway, name, self.waits).await?;
        info!(name, "stop completed");

        let status = self.status().await?;
        Ok(StopOutcome {
            image_id,
            pruned,
            status,
        })
    }

    /// Save the Name's instance, if there is one, and prune older images.
    async fn save_instance(&self, name: &str) -> CfstackResult<(Option<String>, Vec<String>)> {
        let Some(instance) = find_instance(self.gateway, name).await? else {
            warn!(name, "instance not found so no image was saved");
            return Ok((None, Vec::new()));
        };

        let saved = self.save_image(name, &instance.instance_id).await?;
        let pruned = self.prune_images(name, &saved).await?;
        Ok((Some(saved), pruned))
    }

    async fn save_image(&self, name: &str, instance_id: &str) -> CfstackResult<String> {
        info!(name, instance_id, "saving image");
        let image_id = self
            .gateway
            .create_image(CreateImageRequest {
                instance_id: instance_id.to_owned(),
                image_name: format!("{name} {instance_id}"),
                tags: shape::key_values([(NAME_TAG, name), (SEARCH_TAG, name)]),
            })
            .await?;

        wait_image_available(self.gateway, &image_id, self.waits).await?;
        info!(name, image_id = %image_id, "image available");
        Ok(image_id)
    }

    /// Deregister every image for the Name except `keep`.
    async fn prune_images(&self, name: &str, keep: &str) -> CfstackResult<Vec<String>> {
        let stale: Vec<String> = list_images(self.gateway, name)
            .await?
            .into_iter()
            .map(|image| image.image_id)
            .filter(|image_id| image_id != keep)
            .collect();

        if !stale.is_empty() {
            info!(name, count = stale.len(), "removing old images");
        }
        for image_id in &stale {
            self.gateway.deregister_image(image_id.clone()).await?;
        }
        Ok(stale)
    }
}
