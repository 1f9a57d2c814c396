//! `status`: list live resources by Name.

use std::fmt;

use tracing::info;

use super::Lifecycle;
use crate::error::Result as CfstackResult;
use crate::provider::shape::{self, key_values};
use crate::provider::{EpochMillis, KeyValues, ProviderGateway, TaggedResource};
use crate::template::TemplateSource;

/// Names of the live resources of each kind, oldest first.
///
/// Resources without a Name tag appear as `unknown`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Running instances.
    pub instances: Vec<String>,
    /// Account-owned images.
    pub images: Vec<String>,
    /// Volumes.
    pub volumes: Vec<String>,
    /// Account-owned snapshots.
    pub snapshots: Vec<String>,
    /// Live stacks.
    pub stacks: Vec<String>,
    /// Allocated elastic IP addresses.
    pub addresses: Vec<String>,
}

impl StatusReport {
    fn sections(&self) -> [(&'static str, &[String]); 6] {
        [
            ("instances", &self.instances),
            ("images", &self.images),
            ("volumes", &self.volumes),
            ("snapshots", &self.snapshots),
            ("stacks", &self.stacks),
            ("addresses", &self.addresses),
        ]
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, names) in self.sections() {
            let listed = if names.is_empty() {
                String::from("-")
            } else {
                names.join(", ")
            };
            writeln!(f, "{label:<10} {:>3}  {listed}", names.len())?;
        }
        Ok(())
    }
}

/// Order resources by time (missing times first, ties by id) and return
/// their Names.
fn names_by_age<R>(
    mut resources: Vec<R>,
    key: impl Fn(&R) -> (Option<EpochMillis>, &str),
    tags: impl Fn(&R) -> &KeyValues,
) -> Vec<String> {
    resources.sort_by(|a, b| key(a).cmp(&key(b)));
    resources.iter().map(|r| shape::name_tag(tags(r))).collect()
}

fn tagged_names(resources: Vec<TaggedResource>) -> Vec<String> {
    names_by_age(
        resources,
        |r| (r.created_at, r.id.as_str()),
        |r| &r.tags,
    )
}

impl<G, T> Lifecycle<'_, G, T>
where
    G: ProviderGateway + ?Sized,
    T: TemplateSource + ?Sized,
{
    /// Collect the Names of every live resource.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if any listing fails.
    pub async fn status(&self) -> CfstackResult<StatusReport> {
        let running = self
            .gateway
            .describe_instances(key_values([("instance_state_name", "running")]))
            .await?;
        let images = self.gateway.describe_images(KeyValues::new()).await?;
        let volumes = self.gateway.describe_volumes(KeyValues::new()).await?;
        let snapshots = self.gateway.describe_snapshots(KeyValues::new()).await?;
        let mut stacks = self.gateway.list_stacks().await?;
        let addresses = self.gateway.describe_addresses().await?;

        stacks.sort_by(|a, b| (a.created_at, &a.name).cmp(&(b.created_at, &b.name)));

        let report = StatusReport {
            instances: names_by_age(
                running,
                |i| (i.launched_at, i.instance_id.as_str()),
                |i| &i.tags,
            ),
            images: names_by_age(images, |i| (i.created_at, i.image_id.as_str()), |i| &i.tags),
            volumes: tagged_names(volumes),
            snapshots: tagged_names(snapshots),
            stacks: stacks.into_iter().map(|stack| stack.name).collect(),
            addresses,
        };

        info!(
            instances = report.instances.len(),
            images = report.images.len(),
            volumes = report.volumes.len(),
            snapshots = report.snapshots.len(),
            stacks = report.stacks.len(),
            addresses = report.addresses.len(),
            "resources in use"
        );
        Ok(report)
    }
}
