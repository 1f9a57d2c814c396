//! `cfstack` application entry point.
//!
//! It uses `eyre` for opaque error handling at the application boundary,
//! converting domain-specific errors into human-readable reports that name
//! the command and the stack involved.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/cfstack/config.toml` or path from `CFSTACK_CONFIG_PATH`)
//! 3. Environment variables (`CFSTACK_*`)
//! 4. Command-line arguments

use cfstack::config::{AppConfig, Cli, Commands, load_config};
use cfstack::error::{ProviderError, Result as CfstackResult};
use cfstack::lifecycle::{Lifecycle, StartRequest, StatusReport};
use cfstack::naming::NamePool;
use cfstack::provider::{AwsGateway, RegionResolver};
use cfstack::template::TemplateLoader;
use clap::Parser;
use eyre::{Report, Result as EyreResult, WrapErr};
use mockable::DefaultEnv;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset. SDK internals only report
/// warnings.
const DEFAULT_LOG_FILTER: &str =
    "info,aws_config=warn,aws_smithy_runtime=warn,aws_sdk_ec2=warn,aws_sdk_cloudformation=warn";

/// Application entry point.
///
/// Loads configuration, connects to the provider, then dispatches to the
/// appropriate workflow. Errors are wrapped with the command and subject so
/// the report reads e.g. `stop falcon: ...`.
fn main() -> EyreResult<()> {
    init_logging();

    // Parse CLI first (for subcommand dispatch and global options).
    let cli = Cli::parse();

    // Load configuration with layered precedence: defaults < file < env < CLI.
    let config = load_config(&cli).map_err(Report::from)?;

    run(&cli, &config).wrap_err_with(|| describe(&cli.command))
}

/// Send logs to stderr so stdout carries only the status report.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The command and its subject, for error context.
fn describe(command: &Commands) -> String {
    match command {
        Commands::Start(args) => args
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map_or_else(
                || format!("start {}", args.template),
                |name| format!("start {} {name}", args.template),
            ),
        Commands::Stop(args) => format!("stop {}", args.name),
        Commands::Terminate(args) => format!("terminate {}", args.name),
        Commands::Status => String::from("status"),
    }
}

/// Execute the CLI command, returning domain-specific errors.
///
/// Keeps semantic errors inside the run loop so the CLI boundary owns
/// conversion to `eyre::Report`.
fn run(cli: &Cli, config: &AppConfig) -> CfstackResult<()> {
    let runtime = tokio::runtime::Runtime::new().map_err(|e| {
        ProviderError::RuntimeCreationFailed {
            message: e.to_string(),
        }
    })?;
    let names = NamePool::load(&config.names)?;
    let templates = TemplateLoader::new(config.templates.dir.clone());

    let env = DefaultEnv::new();
    let resolver = RegionResolver::new(&env);
    let gateway = runtime.block_on(AwsGateway::connect_with_fallback(
        config.region.as_deref(),
        config.profile.as_deref(),
        &resolver,
    ));

    let lifecycle = Lifecycle::new(&gateway, &templates, &names, config.wait.policy());
    runtime.block_on(dispatch(&cli.command, &lifecycle))
}

async fn dispatch(
    command: &Commands,
    lifecycle: &Lifecycle<'_, AwsGateway, TemplateLoader>,
) -> CfstackResult<()> {
    match command {
        Commands::Start(args) => {
            let outcome = lifecycle
                .start(&StartRequest {
                    template: args.template.clone(),
                    name: args.name.clone(),
                    wait: args.wait,
                })
                .await?;
            info!(name = %outcome.name, stack_id = %outcome.stack_id, "stack launch submitted");
            Ok(())
        }
        Commands::Stop(args) => {
            let outcome = lifecycle.stop(&args.name).await?;
            print_report(&outcome.status);
            Ok(())
        }
        Commands::Terminate(args) => {
            let outcome = lifecycle.terminate(&args.name).await?;
            print_report(&outcome.status);
            Ok(())
        }
        Commands::Status => {
            let report = lifecycle.status().await?;
            print_report(&report);
            Ok(())
        }
    }
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_report(report: &StatusReport) {
    print!("{report}");
}
