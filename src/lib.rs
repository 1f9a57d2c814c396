//! Start, snapshot-stop and terminate named virtual-machine stacks.
//!
//! `cfstack` wraps a cloud provider's compute and stack-orchestration APIs.
//! A stack is launched from a template under a Name; stopping it saves the
//! instance as an image tagged with that Name and deletes the stack, and the
//! next `start` under the same Name resumes from that image. Between runs
//! nothing is stored locally: the Name tag on each resource is the only
//! link between a stack, its instance, its images and their snapshots.
//!
//! # Modules
//!
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`error`]: Semantic error types for the application
//! - [`lifecycle`]: The `start`, `stop`, `terminate` and `status` workflows
//! - [`naming`]: Resource lookup by Name and fresh-name allocation
//! - [`provider`]: Provider gateway trait, AWS implementation and bounded waits
//! - [`template`]: Stack template resolution and loading

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod naming;
pub mod provider;
pub mod template;
