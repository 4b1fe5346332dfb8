//! Arena-backed storage for files and bindings.
//!
//! Every cross-file "pointer" in the binding graph is an index into one of
//! two flat arenas: [`FileId`] into the file store and [`BindingId`] into
//! the binding arena. Aliasing an export is copying an index, which makes
//! the import cycles of real module graphs representable without ownership
//! gymnastics.

use crate::construct::{ImportBinding, SymbolReference};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::PathBuf;

/// Reserved binding name for a file's whole-module export container.
pub const MODULE_CONTAINER: &str = "*module*";

/// Reserved binding name for the default export.
pub const DEFAULT_EXPORT: &str = "default";

/// Index of a file in the file store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a binding in the binding arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub(crate) u32);

impl BindingId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a resolved import target turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A parseable source file on disk.
    SourceFile,
    /// A specifier the resolver could not map to a file. Opaque leaf, not
    /// an error.
    UnresolvedPath,
    /// A runtime builtin module. Opaque leaf.
    BuiltinModule,
}

/// One record per distinct resolved file.
#[derive(Debug)]
pub struct FileRecord {
    /// Canonical path; the identity key.
    pub location: PathBuf,
    pub kind: FileKind,
    pub is_entry: bool,
    /// Root of the file's export surface. Always present; non-analyzable
    /// files carry a stub with a single `default` child.
    pub exports: BindingId,
    /// Every file this one imports, statically or dynamically.
    pub imported_files: FxHashSet<FileId>,
    /// Statically imported subset of `imported_files`.
    pub static_imported_files: FxHashSet<FileId>,
    /// Chunk names attached to this file, in discovery order.
    pub chunk_tags: Vec<String>,
    /// Minified byte size, filled on first demand.
    pub byte_size: Option<u64>,
    pub visited: bool,
    pub parse_failed: bool,
    /// The file's import bindings, materialized by the builder's import
    /// stage. Per-file, never shared.
    pub imports: Vec<ImportBinding>,
    /// The file's lowered identifier references, retained so the cascade
    /// can undo the file's contributions without the frontend.
    pub references: Vec<SymbolReference>,
}

impl FileRecord {
    pub(crate) fn new(location: PathBuf, kind: FileKind, exports: BindingId) -> Self {
        Self {
            location,
            kind,
            is_entry: false,
            exports,
            imported_files: FxHashSet::default(),
            static_imported_files: FxHashSet::default(),
            chunk_tags: Vec::new(),
            byte_size: None,
            visited: false,
            parse_failed: false,
            imports: Vec::new(),
            references: Vec::new(),
        }
    }
}

/// How much of a binding's total count one consuming file contributed.
///
/// Recorded so that the exact contribution can be subtracted again when the
/// consumer is later found dead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerCounts {
    pub reference_count: i64,
    /// The subset of `reference_count` that came from re-export positions
    /// rather than genuine uses.
    pub export_only_reference_count: i64,
}

impl ConsumerCounts {
    /// The consumer's genuine (non-re-export) contribution.
    pub fn net(self) -> i64 {
        self.reference_count - self.export_only_reference_count
    }
}

/// One exported symbol, whole-module container, or nested member of a
/// structured export.
///
/// Bindings are shared by index: every importer of a symbol holds the same
/// [`BindingId`], so a usage increment made while analyzing one file is
/// visible from every other file that can reach the binding.
#[derive(Debug)]
pub struct Binding {
    pub local_name: String,
    pub defining_file: FileId,
    /// Signed: incremented by genuine uses, decremented on cascade-undo.
    pub reference_count: i64,
    /// Sticky public-surface marker. Once an entry file's surface reaches
    /// this binding it stays live for the rest of the run, even at count 0.
    pub is_entry_tainted: bool,
    pub per_consumer: FxHashMap<FileId, ConsumerCounts>,
    /// Nested members, for factory-style exports and whole-module
    /// containers.
    pub children: FxHashMap<String, BindingId>,
}

impl Binding {
    pub(crate) fn new(local_name: String, defining_file: FileId) -> Self {
        Self {
            local_name,
            defining_file,
            reference_count: 0,
            is_entry_tainted: false,
            per_consumer: FxHashMap::default(),
            children: FxHashMap::default(),
        }
    }

    /// Whether some file other than `owner` genuinely refers to this
    /// binding.
    ///
    /// `owner`'s own net contribution is subtracted first: a file's
    /// internal use of its own re-exported binding does not count as
    /// external liveness.
    pub fn is_referred(&self, owner: FileId) -> bool {
        if self.is_entry_tainted {
            return true;
        }
        let own = self
            .per_consumer
            .get(&owner)
            .copied()
            .unwrap_or_default()
            .net();
        self.reference_count - own > 0
    }
}
