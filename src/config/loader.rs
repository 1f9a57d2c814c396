//! Configuration loading with layered precedence.
//!
//! This module loads configuration with the precedence order (lowest to
//! highest): application defaults, configuration file, environment variables,
//! command-line arguments.
//!
//! The layers are composed manually with `MergeComposer` rather than through
//! `OrthoConfig::load()`, because the `Cli` struct owns subcommand dispatch
//! and the `--config` flag, and because typed environment values must fail
//! fast instead of being silently ignored.
//!
//! # Environment Variable Handling
//!
//! String fields (e.g. `CFSTACK_REGION`) are always accepted. Integer fields
//! (`CFSTACK_WAIT_TIMEOUT_SECS`) must parse or loading fails with
//! `ConfigError::InvalidValue`.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::{AppConfig, Cli};
use crate::error::{ConfigError, Result};

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Unsigned 64-bit integer. Invalid values return an error.
    U64,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name (e.g., `CFSTACK_REGION`).
    env_var: &'static str,
    /// The JSON path segments (e.g., `["wait", "timeout_secs"]`).
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "CFSTACK_REGION",
        path: &["region"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "CFSTACK_PROFILE",
        path: &["profile"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "CFSTACK_TEMPLATES_DIR",
        path: &["templates", "dir"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "CFSTACK_NAMES_FILE",
        path: &["names", "file"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "CFSTACK_WAIT_TIMEOUT_SECS",
        path: &["wait", "timeout_secs"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "CFSTACK_WAIT_POLL_INTERVAL_SECS",
        path: &["wait", "poll_interval_secs"],
        var_type: EnvVarType::U64,
    },
];

/// Returns the list of environment variable names recognised by the config
/// loader.
///
/// Tests use this to clear every `CFSTACK_*` variable without keeping a
/// second hard-coded list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load a configuration file and push it to the composer.
///
/// Uses `cap_std::fs_utf8` for capability-oriented filesystem access: the
/// parent directory is opened first and the file is read relative to it.
fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// Resolve the configuration file to load.
///
/// An explicit `--config` path must exist; otherwise discovery falls back to
/// `CFSTACK_CONFIG_PATH` and the dotfile/XDG candidates.
fn resolve_config_path(cli: &Cli) -> Result<Option<Utf8PathBuf>> {
    if let Some(ref path) = cli.config {
        if !path.exists() {
            return Err(ConfigError::FileNotFound { path: path.clone() }.into());
        }
        return Ok(Some(path.clone()));
    }

    let discovery = ConfigDiscovery::builder("cfstack")
        .env_var("CFSTACK_CONFIG_PATH")
        .config_file_name("config.toml")
        .dotfile_name(".cfstack.toml")
        .build();
    Ok(discovery
        .candidates()
        .into_iter()
        .filter(|p| p.exists())
        .find_map(|p| Utf8PathBuf::try_from(p).ok()))
}

/// Load configuration with full layer precedence.
///
/// Later sources override earlier ones:
/// 1. Application defaults defined in the struct
/// 2. Configuration file (`--config`, `CFSTACK_CONFIG_PATH` or discovery)
/// 3. Environment variables prefixed with `CFSTACK_`
/// 4. Command-line arguments (from the provided `Cli`)
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - an explicit `--config` file does not exist
/// - a configuration file is malformed
/// - a typed environment variable has an unparseable value
/// - the merged wait bounds are zero
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(ref path) = resolve_config_path(cli)? {
        load_config_file(path, &mut composer)?;
    }

    let env_values = collect_env_vars()?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    config.wait.validate()?;

    Ok(config)
}

/// Collect `CFSTACK_*` environment variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed environment variable has an
/// unparseable value.
fn collect_env_vars() -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Ok(raw_value) = std::env::var(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::U64 => match raw_value.parse::<u64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected unsigned integer, got '{raw_value}'"),
                    }
                    .into());
                }
            },
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map, creating intermediate
/// objects as needed.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();

    if let Some(ref region) = cli.region {
        overrides.insert("region".to_owned(), Value::String(region.clone()));
    }

    if let Some(ref profile) = cli.profile {
        overrides.insert("profile".to_owned(), Value::String(profile.clone()));
    }

    if let Some(ref dir) = cli.template_dir {
        insert_at_path(
            &mut overrides,
            &["templates", "dir"],
            Value::String(dir.to_string()),
        );
    }

    if overrides.is_empty() {
        Value::Null
    } else {
        Value::Object(overrides)
    }
}
