//! Reference counting over the shared binding graph.
//!
//! The counter re-walks each file's lowered references after the builder
//! has materialized every binding. It is signed: the same walk that added a
//! file's contributions with `Delta::Add` removes them exactly with
//! `Delta::Remove`, and the dead-file cascade depends on that symmetry.

use crate::arena::{BindingId, FileId};
use crate::construct::ReferenceKind;
use crate::graph::ProjectGraph;

/// Direction of a counting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
    /// Apply +1 per reference.
    Add,
    /// Apply −1 per reference (undo).
    Remove,
}

impl Delta {
    fn value(self) -> i64 {
        match self {
            Delta::Add => 1,
            Delta::Remove => -1,
        }
    }
}

/// Applies `delta` for every reference in every file of `files`.
pub fn count_usage(graph: &mut ProjectGraph, files: &[FileId], delta: Delta) {
    for &file in files {
        count_file(graph, file, delta.value());
    }
}

/// Applies `delta` for one file's references.
///
/// A reference only counts if its root identifier matches one of the file's
/// import bindings. Member chains apply the delta at every hop that matches
/// an existing child and stop at the first hop that does not; property
/// access past that point is dynamic and not tracked.
fn count_file(graph: &mut ProjectGraph, file: FileId, delta: i64) {
    let references = std::mem::take(&mut graph.file_mut(file).references);

    for reference in &references {
        let Some(root) = reference.path.first() else {
            continue;
        };
        let Some(import_index) = graph
            .file(file)
            .imports
            .iter()
            .position(|ib| &ib.local_name == root)
        else {
            continue;
        };
        let resolved = graph.file(file).imports[import_index].resolved;

        match reference.kind {
            ReferenceKind::Use => {
                let Some(mut current) = resolved else {
                    continue;
                };
                apply(graph, current, file, delta);
                for hop in &reference.path[1..] {
                    let Some(&child) = graph.binding(current).children.get(hop) else {
                        break;
                    };
                    current = child;
                    apply(graph, current, file, delta);
                }
            }
            ReferenceKind::ReExportPosition => {
                // A re-export appearance never touches the shared count; it
                // is bookkept on the consumer side only.
                graph.file_mut(file).imports[import_index].self_reference_count += delta;
                if let Some(target) = resolved {
                    let counts = graph
                        .binding_mut(target)
                        .per_consumer
                        .entry(file)
                        .or_default();
                    counts.reference_count += delta;
                    counts.export_only_reference_count += delta;
                }
            }
        }
    }

    graph.file_mut(file).references = references;
}

fn apply(graph: &mut ProjectGraph, binding: BindingId, consumer: FileId, delta: i64) {
    let b = graph.binding_mut(binding);
    b.reference_count += delta;
    b.per_consumer.entry(consumer).or_default().reference_count += delta;
}
