//! Conversions between flat key/value maps and the provider's wire shapes.
//!
//! Callers describe filters, tags and stack parameters as a [`KeyValues`]
//! map ("key equals value"). These pure functions turn that map into the
//! filter, tag and parameter arrays the SDK expects, and turn provider tag
//! arrays back into maps. Iteration follows key order, so the produced
//! arrays are deterministic.

use std::collections::BTreeMap;

use aws_sdk_cloudformation::types::Parameter;
use aws_sdk_ec2::types::{Filter, Tag};

/// Ordered mapping from string key to string value.
pub type KeyValues = BTreeMap<String, String>;

/// Tag key correlating every resource kind with its Name.
pub const NAME_TAG: &str = "Name";

/// Placeholder reported for resources without a Name tag.
pub const UNKNOWN_NAME: &str = "unknown";

/// Build a [`KeyValues`] map from string pairs.
#[must_use]
pub fn key_values<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> KeyValues {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}

/// Turn tag criteria into filter criteria: `Name=x` becomes `tag:Name=x`.
#[must_use]
pub fn tag_filter(tags: &KeyValues) -> KeyValues {
    tags.iter()
        .map(|(key, value)| (format!("tag:{key}"), value.clone()))
        .collect()
}

/// Format criteria as provider filters, one single-valued filter per entry.
///
/// Underscores in keys become hyphens so callers can write
/// `instance_state_name` for the provider's `instance-state-name`.
#[must_use]
pub fn filters(criteria: &KeyValues) -> Vec<Filter> {
    criteria
        .iter()
        .map(|(key, value)| {
            Filter::builder()
                .name(key.replace('_', "-"))
                .values(value.clone())
                .build()
        })
        .collect()
}

/// Format a map as provider tags.
#[must_use]
pub fn tags(values: &KeyValues) -> Vec<Tag> {
    values
        .iter()
        .map(|(key, value)| Tag::builder().key(key.clone()).value(value.clone()).build())
        .collect()
}

/// Format a map as stack template parameters.
#[must_use]
pub fn parameters(values: &KeyValues) -> Vec<Parameter> {
    values
        .iter()
        .map(|(key, value)| {
            Parameter::builder()
                .parameter_key(key.clone())
                .parameter_value(value.clone())
                .build()
        })
        .collect()
}

/// Collect provider tags into a map. Tags missing a key are skipped; a
/// missing value maps to the empty string.
#[must_use]
pub fn tags_to_map(tags: &[Tag]) -> KeyValues {
    tags.iter()
        .filter_map(|tag| {
            tag.key()
                .map(|key| (key.to_owned(), tag.value().unwrap_or_default().to_owned()))
        })
        .collect()
}

/// The Name tag of a resource, or [`UNKNOWN_NAME`].
#[must_use]
pub fn name_tag(tags: &KeyValues) -> String {
    tags.get(NAME_TAG)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_NAME.to_owned())
}
