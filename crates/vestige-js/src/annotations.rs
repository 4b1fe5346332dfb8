//! Chunk-name inclusion annotations.
//!
//! A dynamic-load call site may carry a webpack-style magic comment naming
//! the chunk the loaded module should land in:
//!
//! ```js
//! import(/* webpackChunkName: "admin" */ "./admin/panel");
//! ```
//!
//! The annotation is read straight off the call site's source slice, which
//! keeps comment handling out of the AST lowering.

use regex::Regex;
use std::sync::LazyLock;

static CHUNK_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"webpackChunkName\s*:\s*["']([^"']+)["']"#).expect("chunk-name regex compiles")
});

/// Extracts the annotated chunk name from a dynamic-load call site's source
/// text, if present.
pub fn chunk_name_in(call_site: &str) -> Option<String> {
    CHUNK_NAME
        .captures(call_site)
        .map(|captures| captures[1].to_string())
}
