//! Specifier resolution via oxc_resolver.
//!
//! Node builtins are classified up front by name (with or without the
//! `node:` prefix); everything else goes through the resolver. Resolution
//! failures are not errors — the specifier becomes an opaque unresolved
//! leaf in the graph.

use oxc_resolver::{ResolveOptions, Resolver};
use std::path::Path;
use vestige_graph::Resolved;

/// Node builtin module names, matched against bare specifiers.
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Wraps oxc_resolver with Vestige's extension list and builtin
/// classification.
pub struct SpecifierResolver {
    inner: Resolver,
}

impl SpecifierResolver {
    pub fn new(extensions: &[String]) -> Self {
        let options = ResolveOptions {
            extensions: extensions.to_vec(),
            condition_names: vec![
                "node".to_string(),
                "import".to_string(),
                "require".to_string(),
            ],
            ..ResolveOptions::default()
        };
        Self {
            inner: Resolver::new(options),
        }
    }

    /// Resolves `specifier` relative to `from_dir`.
    pub fn resolve(&self, from_dir: &Path, specifier: &str) -> Resolved {
        if is_builtin(specifier) {
            return Resolved::Builtin;
        }
        match self.inner.resolve(from_dir, specifier) {
            Ok(resolution) => Resolved::Source(resolution.full_path()),
            Err(err) => {
                tracing::debug!(specifier, %err, "specifier did not resolve");
                Resolved::Unresolved
            }
        }
    }
}

fn is_builtin(specifier: &str) -> bool {
    // Everything under the node: scheme is a builtin by definition.
    if let Some(rest) = specifier.strip_prefix("node:") {
        return !rest.is_empty();
    }
    let name = specifier.split('/').next().unwrap_or(specifier);
    NODE_BUILTINS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn resolver() -> SpecifierResolver {
        SpecifierResolver::new(&[
            ".js".to_string(),
            ".ts".to_string(),
            ".tsx".to_string(),
        ])
    }

    #[test]
    fn test_builtin_classification() {
        let r = resolver();
        assert_eq!(r.resolve(Path::new("/tmp"), "fs"), Resolved::Builtin);
        assert_eq!(r.resolve(Path::new("/tmp"), "node:fs"), Resolved::Builtin);
        assert_eq!(
            r.resolve(Path::new("/tmp"), "fs/promises"),
            Resolved::Builtin
        );
        assert_eq!(r.resolve(Path::new("/tmp"), "node:test"), Resolved::Builtin);
    }

    #[test]
    fn test_relative_file_resolves_with_extension_probing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("util.ts"), "export const x = 1;\n").unwrap();

        let r = resolver();
        match r.resolve(temp.path(), "./util") {
            Resolved::Source(path) => assert!(path.ends_with("util.ts")),
            other => panic!("expected source resolution, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_specifier_is_unresolved() {
        let temp = TempDir::new().unwrap();
        let r = resolver();
        assert_eq!(
            r.resolve(temp.path(), "./does-not-exist"),
            Resolved::Unresolved
        );
        assert_eq!(
            r.resolve(temp.path(), "some-npm-package"),
            Resolved::Unresolved
        );
    }
}
