//! `terminate`: delete a Name's stack without saving an image.

use tracing::{info, warn};

use super::{Lifecycle, TerminateOutcome};
use crate::error::Result as CfstackResult;
use crate::provider::ProviderGateway;
use crate::template::TemplateSource;

impl<G, T> Lifecycle<'_, G, T>
where
    G: ProviderGateway + ?Sized,
    T: TemplateSource + ?Sized,
{
    /// Delete the stack for `name` if it is live.
    ///
    /// Images and snapshots are kept. An absent stack is only a warning, so
    /// re-running `terminate` is harmless. Deletion is requested but not
    /// waited on.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the stack listing, the deletion request or
    /// the follow-up status listing fails.
    pub async fn terminate(&self, name: &str) -> CfstackResult<TerminateOutcome> {
        let live = self.gateway.list_stacks().await?;
        let deleted = if live.iter().any(|stack| stack.name == name) {
            info!(name, "terminating");
            self.gateway.delete_stack(name.to_owned()).await?;
            true
        } else {
            warn!(name, "stack not found");
            false
        };

        let status = self.status().await?;
        Ok(TerminateOutcome { deleted, status })
    }
}
