//! Chunk membership and aggregate chunk size.
//!
//! A chunk name attaches to the file a dynamic-load call site resolves to
//! (or to an entry file), then flows forward through the static-import
//! closure that file pulls in — equivalently, a file's membership is the
//! union of its own explicit tags and the memberships of every file that
//! statically imports it. Cycles are routine in the input, so membership is
//! computed as a worklist fixpoint rather than by native recursion, and the
//! aggregate-size walk marks files visited before descending.

use crate::arena::{FileId, FileKind};
use crate::graph::ProjectGraph;
use crate::host::ModuleHost;
use rustc_hash::{FxHashMap, FxHashSet};

/// Per-file chunk inputs: explicit tags plus the reverse static-import
/// edge. Built from the address graph and queried independently of the
/// binding surface.
#[derive(Debug, Default)]
pub struct ChunkGraphNode {
    pub explicit_chunks: Vec<String>,
    pub imported_by: FxHashSet<FileId>,
}

/// The chunk side structure, one node per file.
#[derive(Debug, Default)]
pub struct ChunkGraph {
    nodes: FxHashMap<FileId, ChunkGraphNode>,
}

impl ChunkGraph {
    /// Extracts chunk inputs from a graph built with the address-only pass
    /// in [`crate::builder::TraversalMode::All`].
    pub fn extract(graph: &ProjectGraph) -> Self {
        let mut nodes: FxHashMap<FileId, ChunkGraphNode> = FxHashMap::default();
        for file in graph.file_ids() {
            if graph.file(file).kind != FileKind::SourceFile {
                continue;
            }
            nodes.entry(file).or_default().explicit_chunks =
                graph.file(file).chunk_tags.clone();
            for &target in &graph.file(file).static_imported_files {
                if graph.file(target).kind != FileKind::SourceFile {
                    continue;
                }
                nodes.entry(target).or_default().imported_by.insert(file);
            }
        }
        Self { nodes }
    }

    pub fn node(&self, file: FileId) -> Option<&ChunkGraphNode> {
        self.nodes.get(&file)
    }
}

/// Computes every file's chunk membership.
///
/// Membership of `f` = `explicit(f) ∪ ⋃ membership(g)` over all `g` that
/// statically import `f`. The fixpoint is reached by propagating each
/// changed file's set to its importees until nothing grows; a cycle simply
/// stops contributing once its members agree. Names stay in discovery
/// order.
pub fn compute_chunk_membership(chunks: &ChunkGraph) -> FxHashMap<FileId, Vec<String>> {
    let mut membership: FxHashMap<FileId, Vec<String>> = chunks
        .nodes
        .iter()
        .map(|(&file, node)| (file, node.explicit_chunks.clone()))
        .collect();

    // Forward edges, derived from the stored reverse ones.
    let mut forward: FxHashMap<FileId, Vec<FileId>> = FxHashMap::default();
    for (&file, node) in &chunks.nodes {
        for &importer in &node.imported_by {
            forward.entry(importer).or_default().push(file);
        }
    }
    for targets in forward.values_mut() {
        targets.sort();
    }

    let mut worklist: Vec<FileId> = membership
        .iter()
        .filter(|(_, tags)| !tags.is_empty())
        .map(|(&file, _)| file)
        .collect();
    worklist.sort();

    while let Some(source) = worklist.pop() {
        let Some(targets) = forward.get(&source) else {
            continue;
        };
        let tags = membership.get(&source).cloned().unwrap_or_default();
        for &target in targets {
            let entry = membership.entry(target).or_default();
            let mut grew = false;
            for tag in &tags {
                if !entry.contains(tag) {
                    entry.push(tag.clone());
                    grew = true;
                }
            }
            if grew {
                worklist.push(target);
            }
        }
    }

    membership
}

/// Files that belong to more than one chunk, sorted by path.
pub fn files_in_multiple_chunks(
    graph: &ProjectGraph,
    membership: &FxHashMap<FileId, Vec<String>>,
) -> Vec<(FileId, Vec<String>)> {
    let mut shared: Vec<(FileId, Vec<String>)> = membership
        .iter()
        .filter(|(_, chunks)| chunks.len() > 1)
        .map(|(&file, chunks)| (file, chunks.clone()))
        .collect();
    shared.sort_by(|a, b| graph.file(a.0).location.cmp(&graph.file(b.0).location));
    shared
}

/// Result of one aggregate-size query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkAggregate {
    /// Every source file in the chunk's static closure, in discovery
    /// order.
    pub members: Vec<FileId>,
    /// Sum of the members' minified byte sizes.
    pub total_bytes: u64,
}

/// Aggregate-size queries with per-entry memoization.
///
/// A query walks the forward static closure of the entry with an explicit
/// stack, marking files visited before descending so import cycles
/// terminate. Sizes are measured through the host on first touch and
/// cached on the file record.
#[derive(Debug, Default)]
pub struct AggregateSizeEngine {
    memo: FxHashMap<FileId, ChunkAggregate>,
}

impl AggregateSizeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute<H: ModuleHost>(
        &mut self,
        graph: &mut ProjectGraph,
        host: &mut H,
        entry: FileId,
    ) -> ChunkAggregate {
        if let Some(hit) = self.memo.get(&entry) {
            return hit.clone();
        }

        let mut members: Vec<FileId> = Vec::new();
        let mut seen: FxHashSet<FileId> = FxHashSet::default();
        let mut stack = vec![entry];
        seen.insert(entry);

        while let Some(file) = stack.pop() {
            if graph.file(file).kind != FileKind::SourceFile {
                continue;
            }
            members.push(file);
            let mut targets: Vec<FileId> = graph
                .file(file)
                .static_imported_files
                .iter()
                .copied()
                .collect();
            targets.sort_by(|a, b| graph.file(*a).location.cmp(&graph.file(*b).location));
            for target in targets.into_iter().rev() {
                if seen.insert(target) {
                    stack.push(target);
                }
            }
        }

        let total_bytes = members
            .iter()
            .map(|&file| graph.byte_size_or_measure(file, host))
            .sum();

        let aggregate = ChunkAggregate {
            members,
            total_bytes,
        };
        self.memo.insert(entry, aggregate.clone());
        aggregate
    }
}
