//! Error types for Vestige core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Vestige operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum Error {
    /// An entry point file does not exist or matched nothing.
    #[error("Entry point not found: {path}")]
    EntryPointNotFound {
        /// Path or glob that matched no file.
        path: PathBuf,
    },

    /// Configuration is invalid.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// TOML parsing error in a config file.
    #[error("TOML parse error in {file}: {source}")]
    TomlError {
        /// Path to the TOML file with the error.
        file: PathBuf,
        /// The underlying TOML parsing error.
        #[source]
        source: toml::de::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Exclude or entry pattern failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Frontend-specific error (parser, resolver, discovery).
    #[error("Frontend error: {message}")]
    Frontend {
        /// Error message from the frontend.
        message: String,
    },
}

impl From<globset::Error> for Error {
    fn from(err: globset::Error) -> Self {
        Error::Pattern(err.to_string())
    }
}
