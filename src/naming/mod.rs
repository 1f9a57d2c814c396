//! Resource naming and lookup.
//!
//! A Name is the only key tying a stack to its instance, images and
//! snapshots: the stack is called `<name>` and every other resource carries
//! a `Name=<name>` tag. Nothing stores provider identifiers between runs, so
//! each command re-discovers its resources through tag queries.
//!
//! This module holds those queries together with fresh-name allocation from
//! a [`NamePool`].

mod pool;

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IteratorRandom;
use tracing::debug;

pub use pool::NamePool;

use crate::error::{NamingError, ProviderError};
use crate::provider::shape::{self, NAME_TAG, UNKNOWN_NAME};
use crate::provider::{ImageRef, InstanceRef, KeyValues, ProviderGateway};

/// Filter selecting resources tagged `Name=<name>`.
fn name_filter(name: &str) -> KeyValues {
    shape::tag_filter(&shape::key_values([(NAME_TAG, name)]))
}

/// Find the instance currently carrying `name`.
///
/// Instances that are shutting down or terminated are ignored. When several
/// live instances match, the most recently launched wins, ties broken by the
/// greater instance id.
///
/// # Errors
///
/// Returns the gateway's error if the instance query fails. No match is
/// `Ok(None)`.
pub async fn find_instance<G>(gateway: &G, name: &str) -> Result<Option<InstanceRef>, ProviderError>
where
    G: ProviderGateway + ?Sized,
{
    let mut live: Vec<InstanceRef> = gateway
        .describe_instances(name_filter(name))
        .await?
        .into_iter()
        .filter(InstanceRef::is_live)
        .collect();

    if live.len() > 1 {
        debug!(name, matches = live.len(), "several live instances carry this name");
    }

    live.sort_by(|a, b| (a.launched_at, &a.instance_id).cmp(&(b.launched_at, &b.instance_id)));
    Ok(live.pop())
}

/// Images tagged with `name`, oldest first.
///
/// # Errors
///
/// Returns the gateway's error if the image query fails.
pub async fn list_images<G>(gateway: &G, name: &str) -> Result<Vec<ImageRef>, ProviderError>
where
    G: ProviderGateway + ?Sized,
{
    let mut images = gateway.describe_images(name_filter(name)).await?;
    images.sort_by(|a, b| (a.created_at, &a.image_id).cmp(&(b.created_at, &b.image_id)));
    Ok(images)
}

/// Names that a fresh allocation must avoid: the Name tag of every owned
/// image plus every live stack name.
///
/// # Errors
///
/// Returns the gateway's error if either listing fails.
pub async fn names_in_use<G>(gateway: &G) -> Result<BTreeSet<String>, ProviderError>
where
    G: ProviderGateway + ?Sized,
{
    let images = gateway.describe_images(KeyValues::new()).await?;
    let stacks = gateway.list_stacks().await?;

    Ok(images
        .iter()
        .map(|image| shape::name_tag(&image.tags))
        .chain(stacks.into_iter().map(|stack| stack.name))
        .collect())
}

/// Pick a candidate uniformly at random from those not in use.
///
/// # Errors
///
/// Returns `NamingError::NoNamesAvailable` when every candidate is taken.
pub fn allocate_fresh_name<R>(
    pool: &NamePool,
    in_use: &BTreeSet<String>,
    rng: &mut R,
) -> Result<String, NamingError>
where
    R: Rng + ?Sized,
{
    pool.names()
        .iter()
        .filter(|candidate| !in_use.contains(*candidate) && candidate.as_str() != UNKNOWN_NAME)
        .choose(rng)
        .cloned()
        .ok_or(NamingError::NoNamesAvailable {
            candidates: pool.len(),
        })
}
