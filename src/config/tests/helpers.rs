//! Shared fixtures and helper functions for config tests.

use std::sync::Arc;

use ortho_config::MergeComposer;
use rstest::fixture;

use crate::config::AppConfig;

/// Fixture providing an `AppConfig` parsed from a full TOML example.
#[fixture]
pub fn app_config_from_full_toml() -> AppConfig {
    let toml = r#"
        region = "eu-west-1"
        profile = "lab"

        [templates]
        dir = "/srv/cfstack/templates"

        [names]
        file = "/srv/cfstack/names.txt"

        [wait]
        timeout_secs = 900
        poll_interval_secs = 5
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing an `AppConfig` parsed from a minimal TOML example.
#[fixture]
pub fn app_config_from_partial_toml() -> AppConfig {
    let toml = r#"
        region = "us-east-1"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(AppConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `AppConfig`.
pub fn merge_config(composer: MergeComposer) -> Result<AppConfig, Arc<ortho_config::OrthoError>> {
    AppConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that a config has all default values.
pub fn assert_config_has_defaults(config: &AppConfig) {
    assert!(config.region.is_none(), "region should be unset");
    assert!(config.profile.is_none(), "profile should be unset");
    assert_eq!(config.templates.dir.as_str(), "templates");
    assert!(config.names.file.is_none(), "names.file should be unset");
    assert_eq!(config.wait.timeout_secs, 3600);
    assert_eq!(config.wait.poll_interval_secs, 15);
}
