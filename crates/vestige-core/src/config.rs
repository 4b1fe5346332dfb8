//! Analysis configuration.
//!
//! Every entry point receives an explicit [`AnalysisConfig`]; there is no
//! global configuration state. A project may additionally carry a
//! `.vestige.toml` file whose values fill in whatever the caller left at
//! the defaults.

use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default source file extensions considered during discovery.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs"];

/// Configuration passed into each analysis entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Project root; discovery and resolution are scoped to this directory.
    pub project_root: PathBuf,

    /// Entry files or globs, relative to the project root.
    ///
    /// Entry files are public surface: their exports are live regardless of
    /// reference counts.
    pub entries: Vec<String>,

    /// Glob patterns excluded from the checked-file universe.
    pub exclude: Vec<String>,

    /// Source file extensions to consider.
    pub extensions: Vec<String>,

    /// Maximum depth for the dependency listing feature. `None` means
    /// unlimited.
    pub max_depth: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            entries: Vec::new(),
            exclude: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            max_depth: None,
        }
    }
}

impl AnalysisConfig {
    /// Builds the exclude matcher from the configured glob patterns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] if a glob fails to compile.
    pub fn exclude_matcher(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            builder.add(Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }
}

/// On-disk `.vestige.toml` schema.
///
/// All fields are optional; absent fields leave the caller's
/// [`AnalysisConfig`] untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Entry files or globs.
    pub entries: Option<Vec<String>>,
    /// Exclude glob patterns.
    pub exclude: Option<Vec<String>>,
    /// Source file extensions.
    pub extensions: Option<Vec<String>>,
    /// Dependency listing depth limit.
    pub max_depth: Option<usize>,
}

impl ConfigFile {
    /// Loads `.vestige.toml` from the project root.
    ///
    /// Returns the default (empty) config if no file exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TomlError`] if the file exists but does not parse,
    /// or [`Error::Io`] if it exists but cannot be read.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(".vestige.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|source| Error::TomlError { file: path, source })
    }

    /// Merges file values under `config`. CLI-provided values win: only
    /// fields still at their defaults are replaced.
    pub fn apply(self, config: &mut AnalysisConfig) {
        if config.entries.is_empty() {
            if let Some(entries) = self.entries {
                config.entries = entries;
            }
        }
        if config.exclude.is_empty() {
            if let Some(exclude) = self.exclude {
                config.exclude = exclude;
            }
        }
        if let Some(extensions) = self.extensions {
            let default: Vec<String> = DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect();
            if config.extensions == default {
                config.extensions = extensions;
            }
        }
        if config.max_depth.is_none() {
            config.max_depth = self.max_depth;
        }
    }
}
