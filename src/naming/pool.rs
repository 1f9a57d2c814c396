//! Candidate names for fresh stacks.

use std::collections::BTreeSet;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::config::NamesConfig;
use crate::error::NamingError;

/// Candidate list compiled into the binary.
const EMBEDDED_NAMES: &str = include_str!("names.txt");

/// The set of names `start` may allocate from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePool {
    names: BTreeSet<String>,
}

impl NamePool {
    /// Build a pool from individual names, trimming whitespace and dropping
    /// blanks and duplicates.
    ///
    /// # Errors
    ///
    /// Returns `NamingError::EmptyCandidatePool` if nothing usable remains.
    pub fn from_names<I, S>(names: I) -> Result<Self, NamingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_owned())
            .filter(|name| !name.is_empty())
            .collect();
        if unique.is_empty() {
            return Err(NamingError::EmptyCandidatePool);
        }
        Ok(Self { names: unique })
    }

    /// Parse a newline-separated list.
    ///
    /// # Errors
    ///
    /// Returns `NamingError::EmptyCandidatePool` if the text holds no names.
    pub fn parse(text: &str) -> Result<Self, NamingError> {
        Self::from_names(text.lines())
    }

    /// The built-in list.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded list is empty.
    pub fn embedded() -> Result<Self, NamingError> {
        Self::parse(EMBEDDED_NAMES)
    }

    /// Read a newline-separated list from `path`.
    ///
    /// # Errors
    ///
    /// Returns `NamingError::CandidateSourceFailed` if the file cannot be
    /// read, or `NamingError::EmptyCandidatePool` if it holds no names.
    pub fn from_file(path: &Utf8Path) -> Result<Self, NamingError> {
        let parent = path
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let file_name = path.file_name().unwrap_or(path.as_str());
        let failed = |message: String| NamingError::CandidateSourceFailed {
            path: path.to_owned(),
            message,
        };

        let dir = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(|e| failed(format!("failed to open directory {parent}: {e}")))?;
        let text = dir
            .read_to_string(file_name)
            .map_err(|e| failed(e.to_string()))?;

        Self::parse(&text)
    }

    /// Load the configured list, falling back to the built-in one.
    ///
    /// # Errors
    ///
    /// See [`NamePool::from_file`].
    pub fn load(config: &NamesConfig) -> Result<Self, NamingError> {
        config
            .file
            .as_deref()
            .map_or_else(Self::embedded, Self::from_file)
    }

    /// Candidate names in sorted order.
    #[must_use]
    pub const fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    /// Number of distinct candidates.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the pool holds no candidates. Construction rejects empty
    /// lists, so a built pool reports `false`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
