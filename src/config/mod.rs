//! Configuration system for cfstack.
//!
//! This module provides the configuration structures and CLI definitions for
//! the cfstack application. Configuration loading and precedence merging is
//! handled by the `ortho_config` crate. Precedence: CLI flags override
//! environment variables, which override configuration files, which override
//! defaults.
//!
//! The configuration file is expected at `~/.config/cfstack/config.toml` by
//! default.
//!
//! # Example Configuration
//!
//! ```toml
//! region = "eu-west-1"
//! profile = "default"
//!
//! [templates]
//! dir = "/home/user/.config/cfstack/templates"
//!
//! [names]
//! file = "/home/user/.config/cfstack/names.txt"
//!
//! [wait]
//! timeout_secs = 3600
//! poll_interval_secs = 15
//! ```

mod cli;
mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{Cli, Commands, StartArgs, StopArgs, TerminateArgs};
pub use loader::{env_var_names, load_config};
pub use types::{AppConfig, NamesConfig, TemplatesConfig, WaitConfig};
