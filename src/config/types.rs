//! Configuration data types for cfstack.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::error::ConfigError;
use crate::provider::WaitPolicy;

/// Template lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Directory searched for `<identifier>.yaml` when `start` is given a
    /// bare identifier.
    #[default(Utf8PathBuf::from("templates"))]
    pub dir: Utf8PathBuf,
}

/// Candidate name configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NamesConfig {
    /// Newline-separated candidate list. The built-in list is used when unset.
    pub file: Option<Utf8PathBuf>,
}

/// Bounds for the polling waits on image creation and stack deletion.
#[derive(Debug, Clone, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct WaitConfig {
    /// Give up waiting after this many seconds.
    #[default = 3600]
    pub timeout_secs: u64,

    /// Seconds between status polls.
    #[default = 15]
    pub poll_interval_secs: u64,
}

impl WaitConfig {
    /// Validates that both wait bounds are non-zero.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first zero field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: String::from("wait.timeout_secs"),
                reason: String::from("must be greater than zero"),
            });
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: String::from("wait.poll_interval_secs"),
                reason: String::from("must be greater than zero"),
            });
        }
        Ok(())
    }

    /// Converts the configured seconds into a [`WaitPolicy`].
    #[must_use]
    pub const fn policy(&self) -> WaitPolicy {
        WaitPolicy {
            timeout: Duration::from_secs(self.timeout_secs),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }
}

/// Root application configuration.
///
/// This structure is loaded from configuration files, environment variables,
/// and command-line arguments with layered precedence. The precedence order
/// (lowest to highest) is: defaults, configuration file, environment variables,
/// command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `CFSTACK_CONFIG_PATH` environment variable
/// 2. `.cfstack.toml` in the current working directory
/// 3. `.cfstack.toml` in the home directory
/// 4. `~/.config/cfstack/config.toml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "CFSTACK",
    post_merge_hook,
    discovery(
        app_name = "cfstack",
        env_var = "CFSTACK_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".cfstack.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// Provider region. Falls back to `AWS_REGION`/`AWS_DEFAULT_REGION`.
    pub region: Option<String>,

    /// Named credentials profile.
    pub profile: Option<String>,

    /// Template lookup configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub templates: TemplatesConfig,

    /// Candidate name configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub names: NamesConfig,

    /// Wait bounds.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub wait: WaitConfig,
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // Blank strings from files or the environment mean "unset".
        self.region = self.region.take().filter(|value| !value.trim().is_empty());
        self.profile = self.profile.take().filter(|value| !value.trim().is_empty());
        Ok(())
    }
}
