//! The closed set of module constructs the engine consumes.
//!
//! Frontends lower their parser's AST into these shapes; the engine never
//! sees parser node types. Adding a frontend means producing
//! [`ModuleSummary`] values, nothing more.

use crate::arena::FileId;

/// One locally-named symbol introduced by an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportClause {
    /// `import x from "m"` — the default export bound to `x`.
    Default { local: String },
    /// `import { a as b } from "m"`.
    Named { imported: String, local: String },
    /// `import * as ns from "m"` or a bound `require("m")`.
    Namespace { local: String },
}

/// A module-level construct relevant to the binding graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construct {
    /// Static import; no clauses for a bare side-effect import.
    StaticImport {
        specifier: String,
        clauses: Vec<ImportClause>,
    },
    /// `import("m")` call site; `chunk_name` comes from an inclusion
    /// annotation and overrides the default per-call-site name.
    DynamicImport {
        specifier: String,
        chunk_name: Option<String>,
    },
    /// Export of a locally declared symbol.
    ExportLocal { name: String },
    /// `export { local as exported }`, `export default local`,
    /// `module.exports = local`. Aliases an import binding when `local`
    /// names one.
    ExportAlias { exported: String, local: String },
    /// Factory-style export: an object literal whose members become child
    /// bindings. A member with a `local` value aliases that symbol.
    ExportObject {
        exported: String,
        members: Vec<(String, Option<String>)>,
    },
    /// `export { imported as exported } from "m"`.
    ExportFrom {
        specifier: String,
        imported: String,
        exported: String,
    },
    /// `export * from "m"` (spread) or `export * as alias from "m"`.
    ExportStarFrom {
        specifier: String,
        alias: Option<String>,
    },
}

/// Why an identifier appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A genuine use.
    Use,
    /// The identifier is the thing being re-exported by an enclosing
    /// export construct. Not a use.
    ReExportPosition,
}

/// One identifier reference, possibly extended by a member-access chain.
///
/// `path[0]` is the local identifier; subsequent elements are property
/// hops (`ns.helpers.format` lowers to `["ns", "helpers", "format"]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolReference {
    pub path: Vec<String>,
    pub kind: ReferenceKind,
}

impl SymbolReference {
    pub fn using(path: Vec<String>) -> Self {
        Self {
            path,
            kind: ReferenceKind::Use,
        }
    }

    pub fn re_export(name: String) -> Self {
        Self {
            path: vec![name],
            kind: ReferenceKind::ReExportPosition,
        }
    }
}

/// Everything the engine needs to know about one lowered file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleSummary {
    pub constructs: Vec<Construct>,
    pub references: Vec<SymbolReference>,
    /// True when the source did not parse; the file contributes a stub
    /// export surface instead of aborting the run.
    pub parse_failed: bool,
}

impl ModuleSummary {
    pub fn failed() -> Self {
        Self {
            parse_failed: true,
            ..Default::default()
        }
    }
}

/// Import binding kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// Aliases the target file's whole export container.
    WholeModule,
    /// Aliases one named export of the target.
    Named,
}

/// A per-file import binding. Unlike [`crate::arena::Binding`] these are
/// never shared across files.
#[derive(Debug, Clone)]
pub struct ImportBinding {
    pub local_name: String,
    pub imported_name: String,
    pub kind: ImportKind,
    pub imported_from: FileId,
    /// Re-export appearances of this local name; kept so a re-export
    /// statement never inflates the count of the thing it re-exports.
    pub self_reference_count: i64,
    /// Target binding, cached once every export surface is built. `None`
    /// when the target name never materialized.
    pub resolved: Option<crate::arena::BindingId>,
}

impl ImportBinding {
    pub fn named(local: &str, imported: &str, from: FileId) -> Self {
        Self {
            local_name: local.to_string(),
            imported_name: imported.to_string(),
            kind: ImportKind::Named,
            imported_from: from,
            self_reference_count: 0,
            resolved: None,
        }
    }

    pub fn whole_module(local: &str, from: FileId) -> Self {
        Self {
            local_name: local.to_string(),
            imported_name: crate::arena::MODULE_CONTAINER.to_string(),
            kind: ImportKind::WholeModule,
            imported_from: from,
            self_reference_count: 0,
            resolved: None,
        }
    }
}
