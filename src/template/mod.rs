//! Stack template resolution and loading.
//!
//! `start` accepts either a path to a template file or a bare identifier
//! such as `web`. An argument with an extension, or one naming an existing
//! file, is taken as a path; anything else resolves to
//! `<templates.dir>/<identifier>.yaml`.
//!
//! Templates are parsed as YAML and re-serialised before submission, so a
//! malformed template fails locally instead of at the provider.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::debug;

use crate::error::TemplateError;

/// Extension appended to bare identifiers.
const TEMPLATE_EXTENSION: &str = "yaml";

/// A loaded stack template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDocument {
    /// The identifier or path given on the command line.
    pub identifier: String,
    /// The file the template was read from.
    pub path: Utf8PathBuf,
    /// Normalised YAML body submitted to the provider.
    pub body: String,
}

/// Source of stack templates.
pub trait TemplateSource {
    /// Resolve and load the template named by `identifier`.
    ///
    /// # Errors
    ///
    /// Returns a `TemplateError` if the template cannot be found, read or
    /// parsed.
    fn load_template(&self, identifier: &str) -> Result<TemplateDocument, TemplateError>;
}

/// Loads templates from the filesystem.
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    dir: Utf8PathBuf,
}

impl TemplateLoader {
    /// Creates a loader resolving bare identifiers under `dir`.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Map an identifier onto the file it names.
    #[must_use]
    pub fn resolve(&self, identifier: &str) -> Utf8PathBuf {
        let candidate = Utf8Path::new(identifier);
        if candidate.extension().is_some() || candidate.is_file() {
            return candidate.to_owned();
        }
        self.dir
            .join(format!("{identifier}.{TEMPLATE_EXTENSION}"))
    }
}

impl TemplateSource for TemplateLoader {
    fn load_template(&self, identifier: &str) -> Result<TemplateDocument, TemplateError> {
        let path = self.resolve(identifier);
        debug!(identifier, path = %path, "loading template");

        let text = read_template(identifier, &path)?;
        let body = normalise(&path, &text)?;

        Ok(TemplateDocument {
            identifier: identifier.to_owned(),
            path,
            body,
        })
    }
}

/// Read a template through a capability on its parent directory.
fn read_template(identifier: &str, path: &Utf8Path) -> Result<String, TemplateError> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().unwrap_or(path.as_str());

    let classify = |error: std::io::Error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            TemplateError::NotFound {
                identifier: identifier.to_owned(),
                path: path.to_owned(),
            }
        } else {
            TemplateError::ReadFailed {
                path: path.to_owned(),
                message: error.to_string(),
            }
        }
    };

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(classify)?;
    dir.read_to_string(file_name).map_err(classify)
}

/// Parse the template and emit it again in canonical form.
fn normalise(path: &Utf8Path, text: &str) -> Result<String, TemplateError> {
    let parse_failed = |message: String| TemplateError::ParseFailed {
        path: path.to_owned(),
        message,
    };

    let document: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| parse_failed(e.to_string()))?;
    if !document.is_mapping() {
        return Err(parse_failed(String::from(
            "a stack template must be a mapping of sections",
        )));
    }
    serde_yaml::to_string(&document).map_err(|e| parse_failed(e.to_string()))
}
