//! Command-line argument definitions for cfstack.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Command-line interface for cfstack.
#[derive(Debug, Parser)]
#[command(name = "cfstack")]
#[command(
    author,
    version,
    about = "Start, snapshot-stop and terminate named CloudFormation stacks"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Provider region, e.g. `eu-west-1`.
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Named credentials profile.
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Directory searched for bare template identifiers.
    #[arg(long, global = true)]
    pub template_dir: Option<Utf8PathBuf>,
}

/// Available subcommands, listed in help in workflow order.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a stack from a template, resuming from the latest saved image.
    Start(StartArgs),

    /// Save an image of the stack's instance, then delete the stack.
    Stop(StopArgs),

    /// Delete a stack without saving an image.
    Terminate(TerminateArgs),

    /// Show live instances, images, volumes, snapshots and stacks.
    #[command(alias = "show")]
    Status,
}

/// Arguments for the `start` subcommand.
#[derive(Debug, Parser)]
pub struct StartArgs {
    /// Template file path, or identifier resolved in the template directory.
    #[arg(required = true)]
    pub template: String,

    /// Stack name; a free name is picked when omitted.
    pub name: Option<String>,

    /// Block until the stack reports creation complete.
    #[arg(long)]
    pub wait: bool,
}

/// Arguments for the `stop` subcommand.
#[derive(Debug, Parser)]
pub struct StopArgs {
    /// Name of the stack to stop.
    #[arg(required = true)]
    pub name: String,
}

/// Arguments for the `terminate` subcommand.
#[derive(Debug, Parser)]
pub struct TerminateArgs {
    /// Name of the stack to terminate.
    #[arg(required = true)]
    pub name: String,
}
