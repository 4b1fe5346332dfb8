//! The JavaScript/TypeScript implementation of the engine's host seam.

use crate::{lower, resolver::SpecifierResolver, size};
use std::path::Path;
use vestige_core::AnalysisConfig;
use vestige_graph::{ModuleHost, ModuleSummary, Resolved};

/// Filesystem-backed host: reads, parses, lowers, resolves, and measures.
pub struct JsHost {
    resolver: SpecifierResolver,
}

impl JsHost {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            resolver: SpecifierResolver::new(&config.extensions),
        }
    }
}

impl ModuleHost for JsHost {
    fn resolve(&self, from_dir: &Path, specifier: &str) -> Resolved {
        self.resolver.resolve(from_dir, specifier)
    }

    fn load_module(&mut self, path: &Path) -> ModuleSummary {
        match std::fs::read_to_string(path) {
            Ok(source_text) => lower::lower_source(&source_text, path),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "could not read module");
                ModuleSummary::failed()
            }
        }
    }

    fn measure_size(&mut self, path: &Path) -> Option<u64> {
        size::minified_size(path)
    }
}
