//! Per-run graph statistics.

use serde::Serialize;

/// Counters accumulated across all traversal phases of one run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GraphStats {
    /// Files parsed successfully.
    pub files_parsed: usize,
    /// Files whose parse failed and were stubbed.
    pub parse_failures: usize,
    /// Alias lookups that pointed at a name absent from the target's
    /// export surface. Tracked, never fatal.
    pub missing_bindings: usize,
    /// Bindings allocated in the arena.
    pub bindings_created: usize,
}
