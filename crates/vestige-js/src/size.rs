//! Minified byte-size measurement.
//!
//! Sizes feed the aggregate chunk computation, so they reflect what a
//! bundler would actually ship: the file is re-emitted through the code
//! generator with minification on and the output length is measured. Files
//! that fail to parse fall back to their raw length.

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::path::Path;

/// Minified byte size of the file at `path`. `None` when the file cannot
/// be read.
pub fn minified_size(path: &Path) -> Option<u64> {
    let source_text = std::fs::read_to_string(path).ok()?;
    Some(minified_size_of(&source_text, path))
}

/// Minified byte size of already-loaded source text.
pub fn minified_size_of(source_text: &str, path: &Path) -> u64 {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::mjs());
    let parsed = Parser::new(&allocator, source_text, source_type).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        return source_text.len() as u64;
    }
    let output = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            ..CodegenOptions::default()
        })
        .build(&parsed.program);
    output.code.len() as u64
}
