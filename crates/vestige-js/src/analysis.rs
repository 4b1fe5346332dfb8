//! The analysis driver: wires discovery, the host, and the graph engine
//! into the reports the CLI renders.

use crate::{discovery, host::JsHost};
use globset::Glob;
use std::path::{Path, PathBuf};
use std::time::Instant;
use vestige_core::{
    AnalysisConfig, ChunkMembership, ChunkReport, ChunkSizeReport, DeadFile, DeadFileReport,
    Error, FileEdges, GraphReport, Result, RunStats,
};
use vestige_graph::{
    build_address_graph, build_binding_graph, compute_chunk_membership, count_usage,
    files_in_multiple_chunks, find_dead_files, AggregateSizeEngine, ChunkGraph, Delta, FileId,
    FileKind, ProjectGraph, TraversalMode,
};

/// Expands the configured entry patterns against the discovered universe.
///
/// Direct paths win; anything else is treated as a glob relative to the
/// project root. A pattern that matches nothing is an error — analyses
/// without live entry points would report every file dead.
pub fn resolve_entries(config: &AnalysisConfig, universe: &[PathBuf]) -> Result<Vec<PathBuf>> {
    // Universe paths are canonical; globs must be matched against paths
    // relative to the canonical root or they never hit.
    let root = config
        .project_root
        .canonicalize()
        .unwrap_or_else(|_| config.project_root.clone());

    let mut entries: Vec<PathBuf> = Vec::new();
    for pattern in &config.entries {
        let direct = config.project_root.join(pattern);
        if let Ok(canonical) = direct.canonicalize() {
            if !entries.contains(&canonical) {
                entries.push(canonical);
            }
            continue;
        }

        let matcher = Glob::new(pattern)
            .map_err(|err| Error::Pattern(err.to_string()))?
            .compile_matcher();
        let mut matched = false;
        for path in universe {
            let relative = path.strip_prefix(&root).unwrap_or(path.as_path());
            if matcher.is_match(relative) {
                matched = true;
                if !entries.contains(path) {
                    entries.push(path.clone());
                }
            }
        }
        if !matched {
            return Err(Error::EntryPointNotFound {
                path: PathBuf::from(pattern),
            });
        }
    }

    if entries.is_empty() {
        return Err(Error::InvalidConfig {
            message: "no entry files configured".to_string(),
        });
    }
    Ok(entries)
}

fn run_stats(graph: &ProjectGraph, files_checked: usize, start: Instant) -> RunStats {
    RunStats {
        files_checked,
        files_parsed: graph.stats.files_parsed,
        parse_failures: graph.stats.parse_failures,
        missing_bindings: graph.stats.missing_bindings,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

fn graph_error(err: vestige_graph::Error) -> Error {
    Error::Frontend {
        message: err.to_string(),
    }
}

/// Dead-file analysis: binding graph over the whole universe, +1 counting
/// pass, then the cascade.
pub fn dead_file_report(config: &AnalysisConfig) -> Result<DeadFileReport> {
    let start = Instant::now();
    let universe = discovery::discover_files(config)?;
    let entries = resolve_entries(config, &universe)?;
    tracing::debug!(files = universe.len(), entries = entries.len(), "universe ready");

    let mut host = JsHost::new(config);
    let mut graph = ProjectGraph::new();
    build_binding_graph(&mut graph, &mut host, &universe, &entries).map_err(graph_error)?;

    let visited: Vec<FileId> = graph
        .file_ids()
        .filter(|&f| graph.file(f).visited)
        .collect();
    count_usage(&mut graph, &visited, Delta::Add);

    let dead = find_dead_files(&mut graph, &mut host, &universe);
    Ok(DeadFileReport {
        dead: dead
            .into_iter()
            .map(|entry| DeadFile {
                path: entry.path,
                priority_score: entry.priority_score,
            })
            .collect(),
        stats: run_stats(&graph, universe.len(), start),
    })
}

/// Chunk-membership analysis over the entry closure.
pub fn chunk_report(config: &AnalysisConfig) -> Result<ChunkReport> {
    let start = Instant::now();
    let universe = discovery::discover_files(config)?;
    let entries = resolve_entries(config, &universe)?;

    let mut host = JsHost::new(config);
    let mut graph = ProjectGraph::new();
    build_address_graph(&mut graph, &mut host, &entries, &entries, TraversalMode::All)
        .map_err(graph_error)?;

    let chunk_graph = ChunkGraph::extract(&graph);
    let membership = compute_chunk_membership(&chunk_graph);

    let shared = files_in_multiple_chunks(&graph, &membership)
        .into_iter()
        .map(|(file, chunks)| ChunkMembership {
            path: graph.file(file).location.clone(),
            chunks,
        })
        .collect();

    let mut chunk_names: Vec<String> = Vec::new();
    for file in graph.file_ids() {
        for tag in &graph.file(file).chunk_tags {
            if !chunk_names.contains(tag) {
                chunk_names.push(tag.clone());
            }
        }
    }

    Ok(ChunkReport {
        shared,
        chunk_names,
        stats: run_stats(&graph, universe.len(), start),
    })
}

/// Aggregate size of the chunk rooted at `entry`.
pub fn chunk_size_report(config: &AnalysisConfig, entry: &Path) -> Result<ChunkSizeReport> {
    let start = Instant::now();
    let entry_path = config
        .project_root
        .join(entry)
        .canonicalize()
        .map_err(|_| Error::EntryPointNotFound {
            path: entry.to_path_buf(),
        })?;

    let mut host = JsHost::new(config);
    let mut graph = ProjectGraph::new();
    let roots = vec![entry_path.clone()];
    let entry_ids =
        build_address_graph(&mut graph, &mut host, &roots, &roots, TraversalMode::All)
            .map_err(graph_error)?;

    let mut engine = AggregateSizeEngine::new();
    let aggregate = engine.compute(&mut graph, &mut host, entry_ids[0]);

    Ok(ChunkSizeReport {
        entry: entry_path,
        members: aggregate
            .members
            .iter()
            .map(|&file| graph.file(file).location.clone())
            .collect(),
        total_bytes: aggregate.total_bytes,
        stats: run_stats(&graph, graph.file_count(), start),
    })
}

/// Depth-filtered dependency listing over the entry closure.
pub fn dependency_report(config: &AnalysisConfig) -> Result<GraphReport> {
    let start = Instant::now();
    let universe = discovery::discover_files(config)?;
    let entries = resolve_entries(config, &universe)?;

    let mut host = JsHost::new(config);
    let mut graph = ProjectGraph::new();
    let entry_ids =
        build_address_graph(&mut graph, &mut host, &entries, &entries, TraversalMode::All)
            .map_err(graph_error)?;

    // Breadth-first from the entries so the depth cut is the shortest
    // import distance.
    let mut depth_of: std::collections::HashMap<FileId, usize> = std::collections::HashMap::new();
    let mut queue: std::collections::VecDeque<FileId> = std::collections::VecDeque::new();
    for id in entry_ids {
        depth_of.insert(id, 0);
        queue.push_back(id);
    }
    while let Some(file) = queue.pop_front() {
        let depth = depth_of[&file];
        if config.max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        let mut targets: Vec<FileId> = graph.file(file).imported_files.iter().copied().collect();
        targets.sort_by(|a, b| graph.file(*a).location.cmp(&graph.file(*b).location));
        for target in targets {
            if graph.file(target).kind != FileKind::SourceFile {
                continue;
            }
            if !depth_of.contains_key(&target) {
                depth_of.insert(target, depth + 1);
                queue.push_back(target);
            }
        }
    }

    let mut listed: Vec<FileId> = depth_of.keys().copied().collect();
    listed.sort_by(|a, b| graph.file(*a).location.cmp(&graph.file(*b).location));

    let files = listed
        .into_iter()
        .map(|file| {
            let record = graph.file(file);
            let mut imports: Vec<PathBuf> = record
                .static_imported_files
                .iter()
                .filter(|&&t| graph.file(t).kind == FileKind::SourceFile)
                .map(|&t| graph.file(t).location.clone())
                .collect();
            imports.sort();
            let mut dynamic: Vec<PathBuf> = record
                .imported_files
                .difference(&record.static_imported_files)
                .filter(|&&t| graph.file(t).kind == FileKind::SourceFile)
                .map(|&t| graph.file(t).location.clone())
                .collect();
            dynamic.sort();
            FileEdges {
                path: record.location.clone(),
                imports,
                dynamic,
            }
        })
        .collect();

    Ok(GraphReport {
        files,
        stats: run_stats(&graph, universe.len(), start),
    })
}
