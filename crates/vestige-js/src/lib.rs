//! Vestige JS - JavaScript/TypeScript frontend for the binding-graph
//! engine.
//!
//! This crate owns everything parser- and filesystem-shaped:
//!
//! - [`lower`]: oxc AST → the engine's construct sum type
//! - [`resolver`]: specifier → canonical file identity (oxc_resolver)
//! - [`discovery`]: gitignore-aware source file enumeration
//! - [`size`]: minified byte-size measurement (oxc_codegen)
//! - [`host`]: the [`vestige_graph::ModuleHost`] implementation tying the
//!   above together
//! - [`analysis`]: the feature drivers producing [`vestige_core`] reports

pub mod analysis;
pub mod annotations;
pub mod discovery;
pub mod host;
pub mod lower;
pub mod resolver;
pub mod size;

pub use analysis::{
    chunk_report, chunk_size_report, dead_file_report, dependency_report, resolve_entries,
};
pub use host::JsHost;
pub use lower::lower_source;
pub use resolver::SpecifierResolver;
