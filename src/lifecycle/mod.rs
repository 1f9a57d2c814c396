//! The named-resource lifecycle workflow.
//!
//! Each command is an ordered sequence of provider calls:
//!
//! - [`Lifecycle::start`] creates a stack from a template, resuming from the
//!   Name's latest saved image when one exists.
//! - [`Lifecycle::stop`] images the Name's instance, waits for the image,
//!   prunes older images and deletes the stack.
//! - [`Lifecycle::terminate`] deletes the stack without saving anything.
//! - [`Lifecycle::status`] lists the live resources by Name.
//!
//! The sequences are safe to re-run: a missing instance or stack is logged
//! as a warning and the remaining steps still run. The one ordering rule
//! that protects data is that `stop` never deletes a stack before the new
//! image is confirmed available.
//!
//! These functions accept library-owned types (not clap types), log through
//! `tracing`, and never print to stdout.

mod start;
mod status;
mod stop;
mod terminate;

pub use status::StatusReport;

use crate::naming::NamePool;
use crate::provider::{ProviderGateway, WaitPolicy};
use crate::template::TemplateSource;

/// Workflow driver borrowing the collaborators built once at startup.
pub struct Lifecycle<'a, G: ?Sized, T: ?Sized> {
    gateway: &'a G,
    templates: &'a T,
    names: &'a NamePool,
    waits: WaitPolicy,
}

impl<'a, G, T> Lifecycle<'a, G, T>
where
    G: ProviderGateway + ?Sized,
    T: TemplateSource + ?Sized,
{
    /// Creates a workflow driver.
    #[must_use]
    pub const fn new(
        gateway: &'a G,
        templates: &'a T,
        names: &'a NamePool,
        waits: WaitPolicy,
    ) -> Self {
        Self {
            gateway,
            templates,
            names,
            waits,
        }
    }
}

/// What `start` should launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    /// Template path or bare identifier.
    pub template: String,
    /// Name to start; a fresh one is allocated when absent or empty.
    pub name: Option<String>,
    /// Block until the stack reports creation complete.
    pub wait: bool,
}

/// Result of a successful `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    /// The Name the stack was created under.
    pub name: String,
    /// Provider stack identifier.
    pub stack_id: String,
    /// Image the stack was launched from, if one was saved for the Name.
    pub image_id: Option<String>,
}

/// Result of a successful `stop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopOutcome {
    /// Image saved from the instance, `None` if no instance was found.
    pub image_id: Option<String>,
    /// Older images deregistered after the save.
    pub pruned: Vec<String>,
    /// Resources still live afterwards.
    pub status: StatusReport,
}

/// Result of a successful `terminate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminateOutcome {
    /// Whether a stack deletion was requested.
    pub deleted: bool,
    /// Resources still live afterwards.
    pub status: StatusReport,
}
