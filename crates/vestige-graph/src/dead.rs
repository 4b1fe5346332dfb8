//! Dead-file detection with cascading removal.
//!
//! A file is dead iff it is not an entry file and either it never earned a
//! FileRecord (nothing references it) or no binding on its export surface
//! is referred from outside the file itself. Removing a dead file can
//! expose newly-dead dependents, so the detector runs a mark-and-undo
//! worklist: each popped file's counted contributions are subtracted once,
//! then its importees are re-tested. Every file is undone at most once,
//! which bounds the loop even on cyclic import graphs.

use crate::arena::{FileId, FileKind};
use crate::counter::{count_usage, Delta};
use crate::graph::ProjectGraph;
use crate::host::ModuleHost;
use rustc_hash::FxHashSet;
use std::path::PathBuf;

/// One dead file, scored for removal priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadFileEntry {
    pub path: PathBuf,
    /// Larger files score higher; unmeasurable files score 0.
    pub priority_score: u64,
}

/// Computes the dead-file set over `universe`, highest priority first.
///
/// `universe` is the checked-file set from discovery, already filtered by
/// the caller's exclude patterns. The graph must have been built with the
/// binding pass and counted with [`Delta::Add`] before this runs; the
/// cascade mutates counts in place (undo), so a graph instance is good for
/// one detection run.
pub fn find_dead_files<H: ModuleHost>(
    graph: &mut ProjectGraph,
    host: &mut H,
    universe: &[PathBuf],
) -> Vec<DeadFileEntry> {
    let universe_set: FxHashSet<&PathBuf> = universe.iter().collect();
    let mut visited: FxHashSet<PathBuf> = FxHashSet::default();
    let mut order: Vec<(PathBuf, Option<FileId>)> = Vec::new();
    let mut worklist: Vec<(PathBuf, Option<FileId>)> = Vec::new();

    // Seed with every universe file that is dead up front.
    for path in universe {
        let id = graph.lookup_file(path);
        let dead = match id {
            None => true,
            Some(file) => is_dead(graph, file),
        };
        if dead && visited.insert(path.clone()) {
            worklist.push((path.clone(), id));
        }
    }

    while let Some((path, id)) = worklist.pop() {
        order.push((path, id));
        let Some(file) = id else {
            // Never referenced: nothing was counted, nothing to undo.
            continue;
        };

        // Subtract exactly what this file contributed in the original
        // counting pass.
        count_usage(graph, &[file], Delta::Remove);

        let mut importees: Vec<FileId> = graph.file(file).imported_files.iter().copied().collect();
        importees.sort_by(|a, b| graph.file(*a).location.cmp(&graph.file(*b).location));

        for target in importees {
            let record = graph.file(target);
            if record.kind != FileKind::SourceFile {
                continue;
            }
            if !universe_set.contains(&record.location) {
                continue;
            }
            if visited.contains(&record.location) {
                continue;
            }
            if is_dead(graph, target) {
                let location = record.location.clone();
                visited.insert(location.clone());
                worklist.push((location, Some(target)));
            }
        }
    }

    tracing::debug!(dead = order.len(), universe = universe.len(), "cascade finished");

    let mut entries: Vec<DeadFileEntry> = order
        .into_iter()
        .map(|(path, id)| {
            let priority_score = match id {
                Some(file) => graph.byte_size_or_measure(file, host),
                None => host.measure_size(&path).unwrap_or(0),
            };
            DeadFileEntry {
                path,
                priority_score,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.priority_score
            .cmp(&a.priority_score)
            .then_with(|| a.path.cmp(&b.path))
    });
    entries
}

/// The dead predicate for a recorded file.
pub fn is_dead(graph: &ProjectGraph, file: FileId) -> bool {
    let record = graph.file(file);
    if record.is_entry {
        return false;
    }
    if record.kind != FileKind::SourceFile {
        return false;
    }
    !graph.surface_is_referred(file)
}
