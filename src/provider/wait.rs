//! Bounded polling waits on asynchronous provider operations.
//!
//! Each wait polls a gateway state query at a fixed interval until the
//! resource reaches the wanted state, fails with a provider error when it
//! reaches a terminal failure state, and fails with
//! [`ProviderError::WaitTimedOut`] once the policy's timeout has elapsed.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

use super::{ImageState, ProviderGateway, StackState};
use crate::error::ProviderError;

/// The only failure a stack deletion can end in.
const DELETE_FAILED: &str = "DELETE_FAILED";

/// Timeout and poll interval for a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Give up after this long.
    pub timeout: Duration,
    /// Delay between polls.
    pub poll_interval: Duration,
}

/// Result of a single poll.
enum Poll {
    Done,
    Pending(String),
}

/// Tracks the deadline of one wait.
struct Deadline {
    started: Instant,
    policy: WaitPolicy,
}

impl Deadline {
    fn start(policy: WaitPolicy) -> Self {
        Self {
            started: Instant::now(),
            policy,
        }
    }

    /// Sleep until the next poll, or fail when no time remains.
    async fn pause(&self, resource: impl FnOnce() -> String) -> Result<(), ProviderError> {
        let elapsed = self.started.elapsed();
        let Some(remaining) = self.policy.timeout.checked_sub(elapsed).filter(|d| !d.is_zero())
        else {
            return Err(ProviderError::WaitTimedOut {
                resource: resource(),
                seconds: self.policy.timeout.as_secs(),
            });
        };
        sleep(remaining.min(self.policy.poll_interval)).await;
        Ok(())
    }
}

/// Block until the image is available.
///
/// An image the provider does not list yet counts as pending.
///
/// # Errors
///
/// - `ProviderError::ImageFailed` if the image reaches a failed state.
/// - `ProviderError::WaitTimedOut` if it is not available within the policy.
/// - Any error returned by the state query.
pub async fn wait_image_available<G>(
    gateway: &G,
    image_id: &str,
    policy: WaitPolicy,
) -> Result<(), ProviderError>
where
    G: ProviderGateway + ?Sized,
{
    let deadline = Deadline::start(policy);
    loop {
        let poll = match gateway.image_state(image_id.to_owned()).await? {
            Some(ImageState::Available) => Poll::Done,
            Some(ImageState::Failed(state)) => {
                return Err(ProviderError::ImageFailed {
                    image_id: image_id.to_owned(),
                    state,
                });
            }
            Some(ImageState::Pending) => Poll::Pending(String::from("pending")),
            None => Poll::Pending(String::from("not yet listed")),
        };
        match poll {
            Poll::Done => return Ok(()),
            Poll::Pending(state) => debug!(image_id, state = %state, "image not yet available"),
        }
        deadline
            .pause(|| format!("image {image_id} to become available"))
            .await?;
    }
}

/// Block until the stack no longer exists.
///
/// Failure states left over from creation, such as `ROLLBACK_COMPLETE`, can
/// still be reported on the first polls after the delete request and count
/// as pending. Only `DELETE_FAILED` ends the wait early.
///
/// # Errors
///
/// - `ProviderError::StackFailed` if deletion fails.
/// - `ProviderError::WaitTimedOut` if the stack outlives the policy.
/// - Any error returned by the state query.
pub async fn wait_stack_deleted<G>(
    gateway: &G,
    stack_name: &str,
    policy: WaitPolicy,
) -> Result<(), ProviderError>
where
    G: ProviderGateway + ?Sized,
{
    let deadline = Deadline::start(policy);
    loop {
        let poll = match gateway.stack_state(stack_name.to_owned()).await? {
            None | Some(StackState::DeleteComplete) => Poll::Done,
            Some(StackState::Failed(status)) if status == DELETE_FAILED => {
                return Err(ProviderError::StackFailed {
                    stack_name: stack_name.to_owned(),
                    status,
                });
            }
            Some(StackState::Failed(status) | StackState::InProgress(status)) => {
                Poll::Pending(status)
            }
            Some(StackState::CreateComplete) => Poll::Pending(String::from("CREATE_COMPLETE")),
        };
        match poll {
            Poll::Done => return Ok(()),
            Poll::Pending(status) => debug!(stack_name, status = %status, "stack not yet deleted"),
        }
        deadline
            .pause(|| format!("stack {stack_name} to be deleted"))
            .await?;
    }
}

/// Block until the stack reports creation complete.
///
/// # Errors
///
/// - `ProviderError::StackFailed` if creation fails, rolls back, or the
///   stack is deleted meanwhile.
/// - `ProviderError::WaitTimedOut` if creation does not finish in time.
/// - Any error returned by the state query.
pub async fn wait_stack_created<G>(
    gateway: &G,
    stack_name: &str,
    policy: WaitPolicy,
) -> Result<(), ProviderError>
where
    G: ProviderGateway + ?Sized,
{
    let deadline = Deadline::start(policy);
    loop {
        let poll = match gateway.stack_state(stack_name.to_owned()).await? {
            Some(StackState::CreateComplete) => Poll::Done,
            Some(StackState::Failed(status)) => {
                return Err(ProviderError::StackFailed {
                    stack_name: stack_name.to_owned(),
                    status,
                });
            }
            Some(StackState::DeleteComplete) => {
                return Err(ProviderError::StackFailed {
                    stack_name: stack_name.to_owned(),
                    status: String::from("DELETE_COMPLETE"),
                });
            }
            Some(StackState::InProgress(status)) => Poll::Pending(status),
            None => Poll::Pending(String::from("not yet listed")),
        };
        match poll {
            Poll::Done => return Ok(()),
            Poll::Pending(status) => debug!(stack_name, status = %status, "stack not yet created"),
        }
        deadline
            .pause(|| format!("stack {stack_name} to be created"))
            .await?;
    }
}
