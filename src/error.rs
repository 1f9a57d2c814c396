//! Semantic error types for the cfstack application.
//!
//! This module defines the error hierarchy for cfstack, following the principle
//! of using semantic error enums (via `thiserror`) for conditions the caller
//! might inspect or report, while reserving opaque errors (`eyre::Report`) for
//! the application boundary.
//!
//! Expected absences (no instance for a Name, no stack to terminate) are not
//! errors: lookups return `Option` or an empty list and the lifecycle commands
//! downgrade them to warnings.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found at the expected path.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path where the configuration file was expected.
        path: Utf8PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error during configuration loading.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised while resolving and reading stack templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template exists for the identifier.
    #[error("template '{identifier}' not found at {path}")]
    NotFound {
        /// The identifier given on the command line.
        identifier: String,
        /// The path the identifier resolved to.
        path: Utf8PathBuf,
    },

    /// The template file exists but could not be read.
    #[error("failed to read template {path}: {message}")]
    ReadFailed {
        /// The resolved template path.
        path: Utf8PathBuf,
        /// A description of the I/O failure.
        message: String,
    },

    /// The template is not a valid YAML document.
    #[error("failed to parse template {path}: {message}")]
    ParseFailed {
        /// The resolved template path.
        path: Utf8PathBuf,
        /// A description of the parse failure.
        message: String,
    },
}

/// Errors raised while loading candidate names or allocating a fresh one.
#[derive(Debug, Error)]
pub enum NamingError {
    /// Every candidate name is already carried by a live resource.
    #[error("no names available: all {candidates} candidate names are in use")]
    NoNamesAvailable {
        /// Size of the candidate pool.
        candidates: usize,
    },

    /// The candidate name file could not be read.
    #[error("failed to read candidate names from {path}: {message}")]
    CandidateSourceFailed {
        /// The configured candidate file.
        path: Utf8PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// The candidate source contained no usable names.
    #[error("candidate name list is empty")]
    EmptyCandidatePool,
}

/// Errors reported by the cloud provider or by waits on its asynchronous
/// operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected or failed an API call.
    #[error("{operation} request failed: {message}")]
    RequestFailed {
        /// The provider operation name, e.g. `CreateStack`.
        operation: &'static str,
        /// The provider's error description.
        message: String,
    },

    /// An asynchronous operation did not complete within the wait bound.
    #[error("timed out after {seconds} seconds waiting for {resource}")]
    WaitTimedOut {
        /// What was being waited on, e.g. `image ami-123 to become available`.
        resource: String,
        /// The configured timeout.
        seconds: u64,
    },

    /// Image creation ended in a terminal non-available state.
    #[error("image '{image_id}' entered state '{state}'")]
    ImageFailed {
        /// The image being created.
        image_id: String,
        /// The state reported by the provider.
        state: String,
    },

    /// A stack operation ended in a failed or rolled-back state.
    #[error("stack '{stack_name}' entered state '{status}'")]
    StackFailed {
        /// The stack name.
        stack_name: String,
        /// The stack status reported by the provider.
        status: String,
    },

    /// A provider response lacked a field the workflow depends on.
    #[error("{operation} response is missing '{field}'")]
    MissingField {
        /// The provider operation name.
        operation: &'static str,
        /// The missing response field.
        field: &'static str,
    },

    /// The async runtime driving provider calls could not be created.
    #[error("failed to create async runtime: {message}")]
    RuntimeCreationFailed {
        /// A description of the failure.
        message: String,
    },
}

/// Top-level error type for the cfstack application.
///
/// This enum aggregates all domain-specific errors into a single type that can
/// be used throughout the application. At the application boundary (main.rs),
/// these errors are converted to `eyre::Report` for human-readable reporting.
#[derive(Debug, Error)]
pub enum CfstackError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A template could not be resolved or read.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Name loading or allocation failed.
    #[error(transparent)]
    Naming(#[from] NamingError),

    /// A provider call or wait failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// A specialised `Result` type for cfstack operations.
pub type Result<T> = std::result::Result<T, CfstackError>;
