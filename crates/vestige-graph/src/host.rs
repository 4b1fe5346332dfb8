//! The seam between the engine and its frontend.
//!
//! Parsing, lowering, specifier resolution, and size measurement are
//! collaborator concerns. The engine drives them through [`ModuleHost`] and
//! stays free of filesystem and parser dependencies.

use crate::construct::ModuleSummary;
use std::path::{Path, PathBuf};

/// What a specifier resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A source file on disk, canonical path.
    Source(PathBuf),
    /// The resolver could not map the specifier to a file.
    Unresolved,
    /// A runtime builtin module.
    Builtin,
}

/// Frontend services consumed by the engine.
pub trait ModuleHost {
    /// Resolves `specifier` relative to `from_dir`.
    fn resolve(&self, from_dir: &Path, specifier: &str) -> Resolved;

    /// Parses and lowers the file at `path`. A file that fails to parse
    /// reports `parse_failed` in its summary rather than erroring; the run
    /// continues.
    fn load_module(&mut self, path: &Path) -> ModuleSummary;

    /// Minified byte size of the file at `path`, if it can be measured.
    fn measure_size(&mut self, path: &Path) -> Option<u64>;
}
