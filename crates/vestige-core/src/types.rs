//! Report types shared between the analysis frontends and the CLI.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-run bookkeeping surfaced alongside every report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Files in the checked universe.
    pub files_checked: usize,
    /// Files parsed successfully.
    pub files_parsed: usize,
    /// Files whose parse failed; they contribute a stub export surface.
    pub parse_failures: usize,
    /// Alias lookups that pointed at a name absent from the target's export
    /// surface. Tracked as warnings, never fatal.
    pub missing_bindings: usize,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
}

/// One unreachable file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadFile {
    /// Canonical path of the dead file.
    pub path: PathBuf,
    /// Removal priority; larger files score higher. Files whose size could
    /// not be measured score 0.
    pub priority_score: u64,
}

/// Result of the dead-file analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadFileReport {
    /// Dead files, highest priority first.
    pub dead: Vec<DeadFile>,
    pub stats: RunStats,
}

/// A file together with the chunks it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMembership {
    pub path: PathBuf,
    /// Chunk names in discovery order.
    pub chunks: Vec<String>,
}

/// Result of the chunk-membership analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkReport {
    /// Files that belong to more than one chunk.
    pub shared: Vec<ChunkMembership>,
    /// Every chunk name seen, in discovery order.
    pub chunk_names: Vec<String>,
    pub stats: RunStats,
}

/// Result of the aggregate-size computation for one chunk root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSizeReport {
    /// The entry file the chunk is rooted at.
    pub entry: PathBuf,
    /// Every file in the chunk's static closure, in discovery order.
    pub members: Vec<PathBuf>,
    /// Sum of the members' minified byte sizes.
    pub total_bytes: u64,
    pub stats: RunStats,
}

/// One file's outgoing edges in the dependency listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEdges {
    pub path: PathBuf,
    /// Statically imported files.
    pub imports: Vec<PathBuf>,
    /// Dynamically loaded files.
    pub dynamic: Vec<PathBuf>,
}

/// Result of the depth-filtered dependency listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphReport {
    pub files: Vec<FileEdges>,
    pub stats: RunStats,
}
