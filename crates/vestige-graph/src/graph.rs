//! The shared binding graph.
//!
//! [`ProjectGraph`] owns both arenas and every lookup index. All phases of
//! a run mutate it in place; nothing here touches the filesystem.

use crate::arena::{
    Binding, BindingId, FileId, FileKind, FileRecord, DEFAULT_EXPORT, MODULE_CONTAINER,
};
use crate::host::ModuleHost;
use crate::stats::GraphStats;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// In-memory graph of files and their shared export bindings.
#[derive(Debug, Default)]
pub struct ProjectGraph {
    files: Vec<FileRecord>,
    by_location: FxHashMap<PathBuf, FileId>,
    bindings: Vec<Binding>,
    binding_index: FxHashMap<(FileId, String), BindingId>,
    pub stats: GraphStats,
}

impl ProjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn file(&self, id: FileId) -> &FileRecord {
        &self.files[id.index()]
    }

    pub fn file_mut(&mut self, id: FileId) -> &mut FileRecord {
        &mut self.files[id.index()]
    }

    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        (0..self.files.len() as u32).map(FileId)
    }

    pub fn lookup_file(&self, location: &Path) -> Option<FileId> {
        self.by_location.get(location).copied()
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.index()]
    }

    pub fn binding_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.bindings[id.index()]
    }

    /// Returns the record for `location`, creating it on first sight.
    ///
    /// A fresh record gets its export container immediately; non-analyzable
    /// kinds also get the single stub `default` child so importers resolve
    /// against them without special cases.
    pub fn intern_file(&mut self, location: PathBuf, kind: FileKind) -> FileId {
        if let Some(&id) = self.by_location.get(&location) {
            return id;
        }
        let id = FileId(self.files.len() as u32);
        self.by_location.insert(location.clone(), id);
        // The container binding must exist before the record that points at
        // it, so allocate it directly.
        let container = self.alloc_binding(id, MODULE_CONTAINER);
        self.files.push(FileRecord::new(location, kind, container));
        if kind != FileKind::SourceFile {
            self.add_stub_default(id);
        }
        id
    }

    /// Interns the binding identified by `(file, name)`.
    pub fn intern_binding(&mut self, file: FileId, name: &str) -> BindingId {
        if let Some(&id) = self.binding_index.get(&(file, name.to_string())) {
            return id;
        }
        self.alloc_binding(file, name)
    }

    fn alloc_binding(&mut self, file: FileId, name: &str) -> BindingId {
        let id = BindingId(self.bindings.len() as u32);
        self.bindings.push(Binding::new(name.to_string(), file));
        self.binding_index.insert((file, name.to_string()), id);
        self.stats.bindings_created += 1;
        id
    }

    /// Looks `name` up on `file`'s export surface.
    ///
    /// This is the single binding-resolution site: a miss against a real,
    /// parsed source file is counted as a missing-binding warning; a miss
    /// against a stub surface falls back to the stub `default` child so the
    /// unknown surface still soaks up uses. A name that only exists as a
    /// member of a structured default export (the CommonJS
    /// `module.exports = { … }` shape) resolves to that member.
    pub fn lookup_export(&mut self, file: FileId, name: &str) -> Option<BindingId> {
        let container = self.files[file.index()].exports;
        if let Some(&id) = self.bindings[container.index()].children.get(name) {
            return Some(id);
        }
        if name != DEFAULT_EXPORT {
            if let Some(&default_id) = self.bindings[container.index()]
                .children
                .get(DEFAULT_EXPORT)
            {
                if let Some(&nested) = self.bindings[default_id.index()].children.get(name) {
                    return Some(nested);
                }
            }
        }
        let record = &self.files[file.index()];
        if record.kind != FileKind::SourceFile || record.parse_failed {
            return self.bindings[container.index()]
                .children
                .get(DEFAULT_EXPORT)
                .copied();
        }
        self.stats.missing_bindings += 1;
        tracing::debug!(
            file = %record.location.display(),
            name,
            "alias target missing from export surface"
        );
        None
    }

    /// Marks `file` as unparseable and stubs its export surface.
    pub fn mark_parse_failed(&mut self, file: FileId) {
        let record = &mut self.files[file.index()];
        if record.parse_failed {
            return;
        }
        record.parse_failed = true;
        self.stats.parse_failures += 1;
        self.add_stub_default(file);
    }

    fn add_stub_default(&mut self, file: FileId) {
        let container = self.files[file.index()].exports;
        if !self.bindings[container.index()]
            .children
            .contains_key(DEFAULT_EXPORT)
        {
            let stub = self.intern_binding(file, DEFAULT_EXPORT);
            self.bindings[container.index()]
                .children
                .insert(DEFAULT_EXPORT.to_string(), stub);
        }
    }

    /// Stickily marks `root` and everything reachable through its children
    /// as entry-tainted.
    ///
    /// Recursion stops the first time a node is already tainted, which
    /// makes the marking idempotent and safe on aliasing cycles.
    pub fn taint(&mut self, root: BindingId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let binding = &mut self.bindings[id.index()];
            if binding.is_entry_tainted {
                continue;
            }
            binding.is_entry_tainted = true;
            stack.extend(binding.children.values().copied());
        }
    }

    /// Whether any binding on `file`'s export surface (the container or a
    /// transitive child) is referred by someone other than `file` itself.
    pub fn surface_is_referred(&self, file: FileId) -> bool {
        let root = self.files[file.index()].exports;
        let mut seen = rustc_hash::FxHashSet::default();
        let mut stack = vec![root];
        seen.insert(root);
        while let Some(id) = stack.pop() {
            let binding = &self.bindings[id.index()];
            if binding.is_referred(file) {
                return true;
            }
            for &child in binding.children.values() {
                if seen.insert(child) {
                    stack.push(child);
                }
            }
        }
        false
    }

    /// The file's minified byte size, measuring through the host on first
    /// demand.
    pub fn byte_size_or_measure<H: ModuleHost + ?Sized>(
        &mut self,
        file: FileId,
        host: &mut H,
    ) -> u64 {
        if let Some(size) = self.files[file.index()].byte_size {
            return size;
        }
        if self.files[file.index()].kind != FileKind::SourceFile {
            return 0;
        }
        let location = self.files[file.index()].location.clone();
        let size = host.measure_size(&location).unwrap_or(0);
        self.files[file.index()].byte_size = Some(size);
        size
    }
}
