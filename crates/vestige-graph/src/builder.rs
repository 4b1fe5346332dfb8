//! Binding graph construction.
//!
//! Two traversal modes over the same lowered constructs:
//!
//! - The **address-only pass** records graph shape (import edges and chunk
//!   tags) and creates no bindings. Chunk analysis and the dependency
//!   listing only need this.
//! - The **binding pass** additionally materializes the shared export
//!   surface. Each file runs two ordered stages: the import stage creates
//!   its [`ImportBinding`]s, and the export stage runs in post-order over
//!   the import edges so that a file's dependencies have finished their own
//!   export surfaces before the file aliases into them.
//!
//! Both passes traverse from every root in the checked universe, not just
//! the entry files: the cascade later needs the counted contributions of
//! files nothing imports yet. Only the configured entry files are flagged
//! `is_entry`.
//!
//! Both passes use explicit stacks; import graphs get deep and cyclic in
//! the wild and native recursion does not survive that.

use crate::arena::{FileId, FileKind, MODULE_CONTAINER};
use crate::construct::{Construct, ImportBinding, ImportClause, ImportKind};
use crate::graph::ProjectGraph;
use crate::host::{ModuleHost, Resolved};
use crate::{Error, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

const MAX_FILES: usize = 100_000;

/// Which import edges the address-only pass follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalMode {
    /// Static imports only; dynamic-load call sites are ignored.
    StaticOnly,
    /// Static and dynamic imports, including chunk tags.
    All,
}

/// Default chunk tag for a file: its stem.
pub fn chunk_tag_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chunk".to_string())
}

/// Builds the address-only graph: per-file adjacency plus chunk tags, no
/// bindings.
///
/// Traversal starts from every file in `roots`; the subset listed in
/// `entries` is flagged as entry files and receives the implicit stem
/// chunk tag. Returns the entry file ids.
///
/// # Errors
///
/// Returns [`Error::GraphTooLarge`] if the traversal discovers more files
/// than the engine is willing to hold.
pub fn build_address_graph<H: ModuleHost>(
    graph: &mut ProjectGraph,
    host: &mut H,
    roots: &[PathBuf],
    entries: &[PathBuf],
    mode: TraversalMode,
) -> Result<Vec<FileId>> {
    let entry_ids = intern_roots(graph, roots, entries);
    let mut stack: Vec<FileId> = root_stack(graph, roots);

    while let Some(file) = stack.pop() {
        if graph.file(file).visited {
            continue;
        }
        check_capacity(graph)?;
        graph.file_mut(file).visited = true;
        if graph.file(file).kind != FileKind::SourceFile {
            continue;
        }

        let location = graph.file(file).location.clone();
        let summary = host.load_module(&location);
        if summary.parse_failed {
            graph.mark_parse_failed(file);
            continue;
        }
        graph.stats.files_parsed += 1;

        let from_dir = parent_dir(&location);
        for construct in &summary.constructs {
            match construct {
                Construct::StaticImport { specifier, .. }
                | Construct::ExportFrom { specifier, .. }
                | Construct::ExportStarFrom { specifier, .. } => {
                    let target = resolve_target(graph, host, &from_dir, specifier);
                    link_import(graph, file, target, true);
                    push_unvisited(graph, &mut stack, target);
                }
                Construct::DynamicImport {
                    specifier,
                    chunk_name,
                } => {
                    if mode == TraversalMode::StaticOnly {
                        continue;
                    }
                    let target = resolve_target(graph, host, &from_dir, specifier);
                    link_import(graph, file, target, false);
                    tag_chunk(graph, target, chunk_name.as_deref());
                    push_unvisited(graph, &mut stack, target);
                }
                _ => {}
            }
        }
    }

    Ok(entry_ids)
}

/// Export constructs and specifier resolutions held between a file's import
/// stage and its export stage.
#[derive(Debug, Default)]
struct PendingModule {
    exports: Vec<Construct>,
    specifiers: FxHashMap<String, FileId>,
}

enum Frame {
    Enter(FileId),
    Exit(FileId),
}

/// Builds the full binding graph over `roots` and everything reachable
/// from them.
///
/// The subset listed in `entries` is flagged as entry files; their export
/// surfaces are entry-tainted as they are assembled. Returns the entry
/// file ids.
///
/// # Errors
///
/// Returns [`Error::GraphTooLarge`] if the traversal discovers more files
/// than the engine is willing to hold.
pub fn build_binding_graph<H: ModuleHost>(
    graph: &mut ProjectGraph,
    host: &mut H,
    roots: &[PathBuf],
    entries: &[PathBuf],
) -> Result<Vec<FileId>> {
    let entry_ids = intern_roots(graph, roots, entries);
    let mut pending: FxHashMap<FileId, PendingModule> = FxHashMap::default();
    let mut processed: Vec<FileId> = Vec::new();
    let mut stack: Vec<Frame> = root_stack(graph, roots)
        .into_iter()
        .map(Frame::Enter)
        .collect();

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(file) => {
                if graph.file(file).visited {
                    continue;
                }
                check_capacity(graph)?;
                graph.file_mut(file).visited = true;
                if graph.file(file).kind != FileKind::SourceFile {
                    continue;
                }
                processed.push(file);
                let children = import_stage(graph, host, file, &mut pending);
                stack.push(Frame::Exit(file));
                for child in children.into_iter().rev() {
                    if !graph.file(child).visited {
                        stack.push(Frame::Enter(child));
                    }
                }
            }
            Frame::Exit(file) => {
                let module = pending.remove(&file).unwrap_or_default();
                export_stage(graph, file, module);
            }
        }
    }

    resolve_import_bindings(graph, &processed);
    Ok(entry_ids)
}

/// Interns every root record; marks and stem-tags the entry subset.
fn intern_roots(graph: &mut ProjectGraph, roots: &[PathBuf], entries: &[PathBuf]) -> Vec<FileId> {
    let entry_set: FxHashSet<&PathBuf> = entries.iter().collect();
    for path in roots {
        let id = graph.intern_file(path.clone(), FileKind::SourceFile);
        if entry_set.contains(path) {
            mark_entry(graph, id);
        }
    }
    entries
        .iter()
        .map(|path| {
            let id = graph.intern_file(path.clone(), FileKind::SourceFile);
            mark_entry(graph, id);
            id
        })
        .collect()
}

fn mark_entry(graph: &mut ProjectGraph, id: FileId) {
    let tag = chunk_tag_for(&graph.file(id).location);
    let record = graph.file_mut(id);
    record.is_entry = true;
    if !record.chunk_tags.contains(&tag) {
        record.chunk_tags.push(tag);
    }
}

/// Roots in reverse so the first root is processed first.
fn root_stack(graph: &ProjectGraph, roots: &[PathBuf]) -> Vec<FileId> {
    roots
        .iter()
        .rev()
        .filter_map(|path| graph.lookup_file(path))
        .collect()
}

fn check_capacity(graph: &ProjectGraph) -> Result<()> {
    if graph.file_count() > MAX_FILES {
        return Err(Error::GraphTooLarge {
            file_count: graph.file_count(),
            max_allowed: MAX_FILES,
        });
    }
    Ok(())
}

fn parent_dir(location: &Path) -> PathBuf {
    location
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn resolve_target<H: ModuleHost>(
    graph: &mut ProjectGraph,
    host: &mut H,
    from_dir: &Path,
    specifier: &str,
) -> FileId {
    match host.resolve(from_dir, specifier) {
        Resolved::Source(path) => graph.intern_file(path, FileKind::SourceFile),
        Resolved::Unresolved => {
            graph.intern_file(PathBuf::from(specifier), FileKind::UnresolvedPath)
        }
        Resolved::Builtin => graph.intern_file(PathBuf::from(specifier), FileKind::BuiltinModule),
    }
}

fn link_import(graph: &mut ProjectGraph, from: FileId, to: FileId, is_static: bool) {
    // A file re-importing itself adds nothing to reachability.
    if from == to {
        return;
    }
    let record = graph.file_mut(from);
    record.imported_files.insert(to);
    if is_static {
        record.static_imported_files.insert(to);
    }
}

fn tag_chunk(graph: &mut ProjectGraph, target: FileId, annotation: Option<&str>) {
    let tag = match annotation {
        Some(name) => name.to_string(),
        None => chunk_tag_for(&graph.file(target).location),
    };
    let record = graph.file_mut(target);
    if !record.chunk_tags.contains(&tag) {
        record.chunk_tags.push(tag);
    }
}

fn push_unvisited(graph: &ProjectGraph, stack: &mut Vec<FileId>, target: FileId) {
    if graph.file(target).kind == FileKind::SourceFile && !graph.file(target).visited {
        stack.push(target);
    }
}

/// Stage 1: create this file's import bindings and record its edges. No
/// cross-file binding linking happens yet.
fn import_stage<H: ModuleHost>(
    graph: &mut ProjectGraph,
    host: &mut H,
    file: FileId,
    pending: &mut FxHashMap<FileId, PendingModule>,
) -> Vec<FileId> {
    let location = graph.file(file).location.clone();
    let summary = host.load_module(&location);
    if summary.parse_failed {
        graph.mark_parse_failed(file);
        return Vec::new();
    }
    graph.stats.files_parsed += 1;

    let from_dir = parent_dir(&location);
    let mut module = PendingModule::default();
    let mut import_bindings: Vec<ImportBinding> = Vec::new();
    let mut children: Vec<FileId> = Vec::new();

    for construct in summary.constructs {
        match construct {
            Construct::StaticImport { specifier, clauses } => {
                let target = resolve_target(graph, host, &from_dir, &specifier);
                link_import(graph, file, target, true);
                children.push(target);
                for clause in &clauses {
                    import_bindings.push(match clause {
                        ImportClause::Default { local } => {
                            ImportBinding::named(local, crate::arena::DEFAULT_EXPORT, target)
                        }
                        ImportClause::Named { imported, local } => {
                            ImportBinding::named(local, imported, target)
                        }
                        ImportClause::Namespace { local } => {
                            ImportBinding::whole_module(local, target)
                        }
                    });
                }
                module.specifiers.insert(specifier, target);
            }
            Construct::DynamicImport {
                specifier,
                chunk_name,
            } => {
                let target = resolve_target(graph, host, &from_dir, &specifier);
                link_import(graph, file, target, false);
                tag_chunk(graph, target, chunk_name.as_deref());
                children.push(target);
                module.specifiers.insert(specifier, target);
            }
            Construct::ExportFrom { ref specifier, .. }
            | Construct::ExportStarFrom { ref specifier, .. } => {
                let target = resolve_target(graph, host, &from_dir, specifier);
                link_import(graph, file, target, true);
                children.push(target);
                module.specifiers.insert(specifier.clone(), target);
                module.exports.push(construct);
            }
            Construct::ExportLocal { .. }
            | Construct::ExportAlias { .. }
            | Construct::ExportObject { .. } => {
                module.exports.push(construct);
            }
        }
    }

    let record = graph.file_mut(file);
    record.imports = import_bindings;
    record.references = summary.references;
    pending.insert(file, module);

    children.retain(|&c| graph.file(c).kind == FileKind::SourceFile);
    children.dedup();
    children
}

/// Stage 2: finalize this file's export surface.
///
/// Star spreads run first and never overwrite, so an explicit export of the
/// same name always wins regardless of statement order.
fn export_stage(graph: &mut ProjectGraph, file: FileId, module: PendingModule) {
    let (stars, others): (Vec<_>, Vec<_>) = module
        .exports
        .iter()
        .partition(|c| matches!(c, Construct::ExportStarFrom { alias: None, .. }));

    for construct in stars {
        if let Construct::ExportStarFrom { specifier, .. } = construct {
            let Some(&source) = module.specifiers.get(specifier) else {
                continue;
            };
            spread_star(graph, file, source);
        }
    }

    for construct in others {
        match construct {
            Construct::ExportLocal { name } => {
                let id = graph.intern_binding(file, name);
                insert_export(graph, file, name, id);
            }
            Construct::ExportAlias { exported, local } => {
                let id = resolve_local_alias(graph, file, local, exported);
                insert_export(graph, file, exported, id);
            }
            Construct::ExportObject { exported, members } => {
                let parent = graph.intern_binding(file, exported);
                for (name, local) in members {
                    let child = match local {
                        Some(local) => resolve_local_alias(graph, file, local, name),
                        None => graph.intern_binding(file, name),
                    };
                    graph
                        .binding_mut(parent)
                        .children
                        .insert(name.clone(), child);
                }
                insert_export(graph, file, exported, parent);
            }
            Construct::ExportFrom {
                specifier,
                imported,
                exported,
            } => {
                let Some(&source) = module.specifiers.get(specifier) else {
                    continue;
                };
                let id = if imported == MODULE_CONTAINER {
                    graph.file(source).exports
                } else {
                    graph
                        .lookup_export(source, imported)
                        .unwrap_or_else(|| graph.intern_binding(file, exported))
                };
                insert_export(graph, file, exported, id);
            }
            Construct::ExportStarFrom {
                specifier,
                alias: Some(alias),
            } => {
                let Some(&source) = module.specifiers.get(specifier) else {
                    continue;
                };
                let id = graph.file(source).exports;
                insert_export(graph, file, alias, id);
            }
            _ => {}
        }
    }
}

/// Copies every named export of `source` (references, not values) into
/// `file`'s container, skipping `default` and names already present.
fn spread_star(graph: &mut ProjectGraph, file: FileId, source: FileId) {
    let source_container = graph.file(source).exports;
    let spread: Vec<(String, crate::arena::BindingId)> = graph
        .binding(source_container)
        .children
        .iter()
        .filter(|(name, _)| name.as_str() != crate::arena::DEFAULT_EXPORT)
        .map(|(name, &id)| (name.clone(), id))
        .collect();

    let container = graph.file(file).exports;
    for (name, id) in spread {
        if graph.binding(container).children.contains_key(&name) {
            continue;
        }
        insert_export(graph, file, &name, id);
    }
}

/// Sets one entry on `file`'s export surface and, for entry files,
/// immediately taints the assigned binding and its children.
fn insert_export(graph: &mut ProjectGraph, file: FileId, name: &str, id: crate::arena::BindingId) {
    let container = graph.file(file).exports;
    graph
        .binding_mut(container)
        .children
        .insert(name.to_string(), id);
    if graph.file(file).is_entry {
        graph.taint(id);
    }
}

/// Resolves the binding a local name stands for at an export site.
///
/// If the name matches an import binding, the export aliases the same
/// shared binding the import points at; otherwise it is a local declaration
/// and gets a binding of its own. A named alias whose target never
/// materialized gets a fresh stub under the exported name so downstream
/// lookups stay total.
fn resolve_local_alias(
    graph: &mut ProjectGraph,
    file: FileId,
    local: &str,
    exported: &str,
) -> crate::arena::BindingId {
    let import = graph
        .file(file)
        .imports
        .iter()
        .find(|ib| ib.local_name == local)
        .map(|ib| (ib.kind, ib.imported_from, ib.imported_name.clone()));

    match import {
        Some((ImportKind::WholeModule, from, _)) => graph.file(from).exports,
        Some((ImportKind::Named, from, imported)) => graph
            .lookup_export(from, &imported)
            .unwrap_or_else(|| graph.intern_binding(file, exported)),
        None => graph.intern_binding(file, local),
    }
}

/// Caches each import binding's target now that every reachable file has
/// finished its export stage.
fn resolve_import_bindings(graph: &mut ProjectGraph, files: &[FileId]) {
    for &file in files {
        for index in 0..graph.file(file).imports.len() {
            let (kind, from, imported) = {
                let ib = &graph.file(file).imports[index];
                (ib.kind, ib.imported_from, ib.imported_name.clone())
            };
            let resolved = match kind {
                ImportKind::WholeModule => Some(graph.file(from).exports),
                ImportKind::Named => graph.lookup_export(from, &imported),
            };
            graph.file_mut(file).imports[index].resolved = resolved;
        }
    }
}
