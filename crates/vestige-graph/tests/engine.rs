//! End-to-end engine tests: build, count, cascade, and chunk phases driven
//! through an in-memory host.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use vestige_graph::{
    build_address_graph, build_binding_graph, compute_chunk_membership, count_usage,
    files_in_multiple_chunks, find_dead_files, AggregateSizeEngine, ChunkGraph, Construct, Delta,
    ImportClause, ModuleHost, ModuleSummary, ProjectGraph, Resolved, SymbolReference,
    TraversalMode,
};

/// In-memory module table. Specifiers resolve relative to the importing
/// file's directory; `./name.ts` maps to `<dir>/name.ts`.
struct MemoryHost {
    modules: FxHashMap<PathBuf, ModuleSummary>,
    sizes: FxHashMap<PathBuf, u64>,
}

impl MemoryHost {
    fn new(modules: Vec<(&str, ModuleSummary)>) -> Self {
        Self {
            modules: modules
                .into_iter()
                .map(|(path, summary)| (PathBuf::from(path), summary))
                .collect(),
            sizes: FxHashMap::default(),
        }
    }

    fn with_size(mut self, path: &str, size: u64) -> Self {
        self.sizes.insert(PathBuf::from(path), size);
        self
    }

    fn universe(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.modules.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl ModuleHost for MemoryHost {
    fn resolve(&self, from_dir: &Path, specifier: &str) -> Resolved {
        if specifier.starts_with("node:") {
            return Resolved::Builtin;
        }
        let relative = specifier.strip_prefix("./").unwrap_or(specifier);
        let candidate = from_dir.join(relative);
        if self.modules.contains_key(&candidate) {
            Resolved::Source(candidate)
        } else {
            Resolved::Unresolved
        }
    }

    fn load_module(&mut self, path: &Path) -> ModuleSummary {
        self.modules
            .get(path)
            .cloned()
            .unwrap_or_else(ModuleSummary::failed)
    }

    fn measure_size(&mut self, path: &Path) -> Option<u64> {
        self.sizes.get(path).copied()
    }
}

fn import_named(specifier: &str, names: &[&str]) -> Construct {
    Construct::StaticImport {
        specifier: specifier.to_string(),
        clauses: names
            .iter()
            .map(|n| ImportClause::Named {
                imported: n.to_string(),
                local: n.to_string(),
            })
            .collect(),
    }
}

fn export_local(name: &str) -> Construct {
    Construct::ExportLocal {
        name: name.to_string(),
    }
}

fn uses(names: &[&str]) -> Vec<SymbolReference> {
    names
        .iter()
        .map(|n| SymbolReference::using(vec![n.to_string()]))
        .collect()
}

/// Builds the binding graph over the host's whole universe with the given
/// entries, then runs the +1 counting pass over every visited file.
fn build_and_count(host: &mut MemoryHost, entries: &[&str]) -> ProjectGraph {
    let mut graph = ProjectGraph::new();
    let entry_paths: Vec<PathBuf> = entries.iter().map(PathBuf::from).collect();
    let universe = host.universe();
    build_binding_graph(&mut graph, host, &universe, &entry_paths).unwrap();
    let visited: Vec<_> = graph
        .file_ids()
        .filter(|&f| graph.file(f).visited)
        .collect();
    count_usage(&mut graph, &visited, Delta::Add);
    graph
}

#[test]
fn file_with_one_used_export_stays_live_despite_unused_siblings() {
    // Entry E imports only {foo} from M; M also exports bar, unused
    // anywhere. M is live, bar's count stays 0, M is not in the dead set.
    let mut host = MemoryHost::new(vec![
        (
            "/p/e.ts",
            ModuleSummary {
                constructs: vec![import_named("./m.ts", &["foo"])],
                references: uses(&["foo"]),
                ..Default::default()
            },
        ),
        (
            "/p/m.ts",
            ModuleSummary {
                constructs: vec![export_local("foo"), export_local("bar")],
                ..Default::default()
            },
        ),
    ]);

    let mut graph = build_and_count(&mut host, &["/p/e.ts"]);

    let m = graph.lookup_file(Path::new("/p/m.ts")).unwrap();
    let bar = graph.lookup_export(m, "bar").unwrap();
    assert_eq!(graph.binding(bar).reference_count, 0);

    let universe = host.universe();
    let dead = find_dead_files(&mut graph, &mut host, &universe);
    assert!(dead.is_empty());
}

#[test]
fn re_export_statement_is_not_a_use() {
    // Entry pulls in a barrel that only does `export { x } from "./m"`.
    // Nothing uses x, so the re-export alone must keep neither file alive
    // and must leave x's count at zero.
    let mut host = MemoryHost::new(vec![
        (
            "/p/main.ts",
            ModuleSummary {
                constructs: vec![Construct::StaticImport {
                    specifier: "./barrel.ts".to_string(),
                    clauses: vec![],
                }],
                ..Default::default()
            },
        ),
        (
            "/p/barrel.ts",
            ModuleSummary {
                constructs: vec![Construct::ExportFrom {
                    specifier: "./m.ts".to_string(),
                    imported: "x".to_string(),
                    exported: "x".to_string(),
                }],
                ..Default::default()
            },
        ),
        (
            "/p/m.ts",
            ModuleSummary {
                constructs: vec![export_local("x")],
                ..Default::default()
            },
        ),
    ]);

    let mut graph = build_and_count(&mut host, &["/p/main.ts"]);

    let m = graph.lookup_file(Path::new("/p/m.ts")).unwrap();
    let x = graph.lookup_export(m, "x").unwrap();
    assert_eq!(graph.binding(x).reference_count, 0);

    let universe = host.universe();
    let dead = find_dead_files(&mut graph, &mut host, &universe);
    let paths: Vec<&Path> = dead.iter().map(|d| d.path.as_path()).collect();
    assert!(paths.contains(&Path::new("/p/barrel.ts")));
    assert!(paths.contains(&Path::new("/p/m.ts")));
}

#[test]
fn local_re_export_through_import_binding_is_not_a_use() {
    // `import { x } from "./m"; export { x };` — the export statement's
    // mention of x arrives as a re-export-position reference and must not
    // bump the shared count.
    let mut host = MemoryHost::new(vec![
        (
            "/p/barrel.ts",
            ModuleSummary {
                constructs: vec![
                    import_named("./m.ts", &["x"]),
                    Construct::ExportAlias {
                        exported: "x".to_string(),
                        local: "x".to_string(),
                    },
                ],
                references: vec![SymbolReference::re_export("x".to_string())],
                ..Default::default()
            },
        ),
        (
            "/p/m.ts",
            ModuleSummary {
                constructs: vec![export_local("x")],
                ..Default::default()
            },
        ),
    ]);

    let mut graph = build_and_count(&mut host, &["/p/barrel.ts"]);

    let m = graph.lookup_file(Path::new("/p/m.ts")).unwrap();
    let x = graph.lookup_export(m, "x").unwrap();
    assert_eq!(graph.binding(x).reference_count, 0);
    // But the barrel's consumer entry records the re-export.
    let barrel = graph.lookup_file(Path::new("/p/barrel.ts")).unwrap();
    let counts = graph
        .binding(x)
        .per_consumer
        .get(&barrel)
        .copied()
        .unwrap();
    assert_eq!(counts.export_only_reference_count, 1);
}

#[test]
fn count_then_uncount_restores_the_graph() {
    let mut host = MemoryHost::new(vec![
        (
            "/p/e.ts",
            ModuleSummary {
                constructs: vec![import_named("./m.ts", &["foo", "bar"])],
                references: uses(&["foo", "foo", "bar"]),
                ..Default::default()
            },
        ),
        (
            "/p/m.ts",
            ModuleSummary {
                constructs: vec![export_local("foo"), export_local("bar")],
                ..Default::default()
            },
        ),
    ]);

    let mut graph = build_and_count(&mut host, &["/p/e.ts"]);

    let e = graph.lookup_file(Path::new("/p/e.ts")).unwrap();
    let m = graph.lookup_file(Path::new("/p/m.ts")).unwrap();
    let foo = graph.lookup_export(m, "foo").unwrap();
    assert_eq!(graph.binding(foo).reference_count, 2);

    count_usage(&mut graph, &[e], Delta::Remove);

    for name in ["foo", "bar"] {
        let id = graph.lookup_export(m, name).unwrap();
        assert_eq!(graph.binding(id).reference_count, 0);
        let counts = graph
            .binding(id)
            .per_consumer
            .get(&e)
            .copied()
            .unwrap_or_default();
        assert_eq!(counts.reference_count, 0);
        assert_eq!(counts.export_only_reference_count, 0);
    }
}

#[test]
fn dead_file_cascade_reaches_transitive_dependents() {
    // D is imported (and used) only by C; C is dead. After undoing C's
    // contribution, D must join the dead set.
    let mut host = MemoryHost::new(vec![
        ("/p/main.ts", ModuleSummary::default()),
        (
            "/p/c.ts",
            ModuleSummary {
                constructs: vec![import_named("./d.ts", &["d"]), export_local("unused")],
                references: uses(&["d"]),
                ..Default::default()
            },
        ),
        (
            "/p/d.ts",
            ModuleSummary {
                constructs: vec![export_local("d")],
                ..Default::default()
            },
        ),
    ]);

    let mut graph = build_and_count(&mut host, &["/p/main.ts"]);

    // Before the cascade, D is live: C genuinely uses it.
    let d = graph.lookup_file(Path::new("/p/d.ts")).unwrap();
    assert!(!vestige_graph::is_dead(&graph, d));

    let universe = host.universe();
    let dead = find_dead_files(&mut graph, &mut host, &universe);
    let paths: Vec<&Path> = dead.iter().map(|p| p.path.as_path()).collect();
    assert!(paths.contains(&Path::new("/p/c.ts")));
    assert!(paths.contains(&Path::new("/p/d.ts")));
    assert!(!paths.contains(&Path::new("/p/main.ts")));
}

#[test]
fn dead_cascade_terminates_on_import_cycles() {
    // Mutually-importing files whose exports only each other use. The
    // cascade must terminate; like reference counting, it conservatively
    // keeps a cycle that sustains itself, because neither member is dead
    // before an undo.
    let mut host = MemoryHost::new(vec![
        ("/p/main.ts", ModuleSummary::default()),
        (
            "/p/a.ts",
            ModuleSummary {
                constructs: vec![import_named("./b.ts", &["b"]), export_local("a")],
                references: uses(&["b"]),
                ..Default::default()
            },
        ),
        (
            "/p/b.ts",
            ModuleSummary {
                constructs: vec![import_named("./a.ts", &["a"]), export_local("b")],
                references: uses(&["a"]),
                ..Default::default()
            },
        ),
    ]);

    let mut graph = build_and_count(&mut host, &["/p/main.ts"]);

    let universe = host.universe();
    let dead = find_dead_files(&mut graph, &mut host, &universe);
    let paths: Vec<&Path> = dead.iter().map(|p| p.path.as_path()).collect();
    assert!(!paths.contains(&Path::new("/p/a.ts")));
    assert!(!paths.contains(&Path::new("/p/b.ts")));
    assert!(!paths.contains(&Path::new("/p/main.ts")));
}

#[test]
fn dead_cascade_collapses_a_cycle_once_an_outside_holder_falls() {
    // holder (dead) uses a; a and b form a cycle where only holder's use
    // keeps a alive and a's use keeps b alive. Undoing holder must
    // cascade through a into b.
    let mut host = MemoryHost::new(vec![
        ("/p/main.ts", ModuleSummary::default()),
        (
            "/p/holder.ts",
            ModuleSummary {
                constructs: vec![import_named("./a.ts", &["a"]), export_local("h")],
                references: uses(&["a"]),
                ..Default::default()
            },
        ),
        (
            "/p/a.ts",
            ModuleSummary {
                constructs: vec![import_named("./b.ts", &["b"]), export_local("a")],
                references: uses(&["b"]),
                ..Default::default()
            },
        ),
        (
            "/p/b.ts",
            ModuleSummary {
                constructs: vec![export_local("b")],
                ..Default::default()
            },
        ),
    ]);

    let mut graph = build_and_count(&mut host, &["/p/main.ts"]);

    let universe = host.universe();
    let dead = find_dead_files(&mut graph, &mut host, &universe);
    let paths: Vec<&Path> = dead.iter().map(|p| p.path.as_path()).collect();
    assert!(paths.contains(&Path::new("/p/holder.ts")));
    assert!(paths.contains(&Path::new("/p/a.ts")));
    assert!(paths.contains(&Path::new("/p/b.ts")));
}

#[test]
fn dead_files_rank_by_size() {
    let mut host = MemoryHost::new(vec![
        ("/p/main.ts", ModuleSummary::default()),
        ("/p/small.ts", ModuleSummary::default()),
        ("/p/big.ts", ModuleSummary::default()),
    ])
    .with_size("/p/small.ts", 10)
    .with_size("/p/big.ts", 5000);

    let mut graph = build_and_count(&mut host, &["/p/main.ts"]);
    let universe = host.universe();
    let dead = find_dead_files(&mut graph, &mut host, &universe);
    assert_eq!(dead.len(), 2);
    assert_eq!(dead[0].path, Path::new("/p/big.ts"));
    assert_eq!(dead[0].priority_score, 5000);
    assert_eq!(dead[1].path, Path::new("/p/small.ts"));
}

#[test]
fn chunk_membership_spans_static_and_dynamic_boundaries() {
    // main (entry, chunk "main") statically imports x; it also dynamically
    // loads panel under the "admin" chunk, and panel statically imports x.
    // x must land in both chunks.
    let mut host = MemoryHost::new(vec![
        (
            "/p/main.ts",
            ModuleSummary {
                constructs: vec![
                    import_named("./x.ts", &[]),
                    Construct::DynamicImport {
                        specifier: "./panel.ts".to_string(),
                        chunk_name: Some("admin".to_string()),
                    },
                ],
                ..Default::default()
            },
        ),
        (
            "/p/panel.ts",
            ModuleSummary {
                constructs: vec![import_named("./x.ts", &[])],
                ..Default::default()
            },
        ),
        ("/p/x.ts", ModuleSummary::default()),
    ]);

    let mut graph = ProjectGraph::new();
    let entries = vec![PathBuf::from("/p/main.ts")];
    build_address_graph(&mut graph, &mut host, &entries, &entries, TraversalMode::All).unwrap();

    let chunks = ChunkGraph::extract(&graph);
    let membership = compute_chunk_membership(&chunks);
    let shared = files_in_multiple_chunks(&graph, &membership);

    let x = graph.lookup_file(Path::new("/p/x.ts")).unwrap();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].0, x);
    let mut names = shared[0].1.clone();
    names.sort();
    assert_eq!(names, vec!["admin".to_string(), "main".to_string()]);
}

#[test]
fn chunk_membership_on_import_cycle_is_uniform() {
    // A→B→C→A with the only explicit tag on A (the entry). All three files
    // end up with the identical membership set, with no infinite loop.
    let cycle = |spec: &str| ModuleSummary {
        constructs: vec![import_named(spec, &[])],
        ..Default::default()
    };
    let mut host = MemoryHost::new(vec![
        ("/p/a.ts", cycle("./b.ts")),
        ("/p/b.ts", cycle("./c.ts")),
        ("/p/c.ts", cycle("./a.ts")),
    ]);

    let mut graph = ProjectGraph::new();
    let entries = vec![PathBuf::from("/p/a.ts")];
    build_address_graph(&mut graph, &mut host, &entries, &entries, TraversalMode::All).unwrap();

    let chunks = ChunkGraph::extract(&graph);
    let membership = compute_chunk_membership(&chunks);

    let a = graph.lookup_file(Path::new("/p/a.ts")).unwrap();
    let b = graph.lookup_file(Path::new("/p/b.ts")).unwrap();
    let c = graph.lookup_file(Path::new("/p/c.ts")).unwrap();
    assert_eq!(membership[&a], vec!["a".to_string()]);
    assert_eq!(membership[&b], membership[&a]);
    assert_eq!(membership[&c], membership[&a]);
}

#[test]
fn aggregate_size_sums_the_static_closure() {
    let mut host = MemoryHost::new(vec![
        (
            "/p/main.ts",
            ModuleSummary {
                constructs: vec![
                    import_named("./lib.ts", &[]),
                    Construct::DynamicImport {
                        specifier: "./lazy.ts".to_string(),
                        chunk_name: None,
                    },
                ],
                ..Default::default()
            },
        ),
        ("/p/lib.ts", ModuleSummary::default()),
        ("/p/lazy.ts", ModuleSummary::default()),
    ])
    .with_size("/p/main.ts", 100)
    .with_size("/p/lib.ts", 50)
    .with_size("/p/lazy.ts", 9000);

    let mut graph = ProjectGraph::new();
    let entries = vec![PathBuf::from("/p/main.ts")];
    let entry_ids =
        build_address_graph(&mut graph, &mut host, &entries, &entries, TraversalMode::All).unwrap();

    let mut engine = AggregateSizeEngine::new();
    let aggregate = engine.compute(&mut graph, &mut host, entry_ids[0]);

    // The dynamically loaded file is its own chunk; only the static
    // closure counts here.
    assert_eq!(aggregate.members.len(), 2);
    assert_eq!(aggregate.total_bytes, 150);
}

#[test]
fn parse_failures_are_counted_and_do_not_poison_siblings() {
    let mut host = MemoryHost::new(vec![
        (
            "/p/main.ts",
            ModuleSummary {
                constructs: vec![
                    import_named("./broken.ts", &["thing"]),
                    import_named("./ok.ts", &["fine"]),
                ],
                references: uses(&["thing", "fine"]),
                ..Default::default()
            },
        ),
        ("/p/broken.ts", ModuleSummary::failed()),
        (
            "/p/ok.ts",
            ModuleSummary {
                constructs: vec![export_local("fine")],
                ..Default::default()
            },
        ),
    ]);

    let mut graph = build_and_count(&mut host, &["/p/main.ts"]);

    assert_eq!(graph.stats.parse_failures, 1);
    assert_eq!(graph.stats.files_parsed, 2);

    // The healthy sibling is fully analyzed and live; the broken file is
    // genuinely used through its stub surface, so it is live too.
    let universe = host.universe();
    let dead = find_dead_files(&mut graph, &mut host, &universe);
    assert!(dead.is_empty());
}
