//! Source file discovery.
//!
//! Walks the project root with gitignore support and returns the checked
//! universe, fully materialized before any graph phase touches it. Exclude
//! patterns from the config are applied here, so downstream phases never
//! see excluded files.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use vestige_core::{AnalysisConfig, Error, Result};

/// Discovers all matching source files under the config's project root,
/// sorted for determinism.
///
/// # Security
/// - Does not follow symlinks
/// - Refuses to scan the filesystem root or system directories
/// - Respects .gitignore
pub fn discover_files(config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let root = config
        .project_root
        .canonicalize()
        .map_err(|_| Error::InvalidConfig {
            message: format!(
                "Project root does not exist: {}",
                config.project_root.display()
            ),
        })?;
    validate_scan_root(&root)?;

    let exclude = config.exclude_matcher()?;
    let mut files = Vec::new();

    for entry in WalkBuilder::new(&root)
        .follow_links(false)
        .hidden(true)
        .git_ignore(true)
        .build()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        if !has_matching_extension(path, &config.extensions) {
            continue;
        }
        let relative = path.strip_prefix(&root).unwrap_or(path);
        if exclude.is_match(relative) {
            continue;
        }
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        files.push(canonical);
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn has_matching_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let dotted = format!(".{ext}");
    extensions.iter().any(|e| e == &dotted)
}

/// Validates that the scan root is safe.
fn validate_scan_root(root: &Path) -> Result<()> {
    if root == Path::new("/") {
        return Err(Error::InvalidConfig {
            message: "Refusing to scan filesystem root".to_string(),
        });
    }

    #[cfg(unix)]
    {
        let dangerous_paths = ["/bin", "/sbin", "/usr", "/etc", "/var", "/sys", "/proc"];
        for dangerous in &dangerous_paths {
            if root.starts_with(dangerous) {
                return Err(Error::InvalidConfig {
                    message: format!("Refusing to scan system directory: {dangerous}"),
                });
            }
        }
    }

    Ok(())
}
