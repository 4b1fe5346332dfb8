//! # vestige-graph
//!
//! Pure in-memory binding-graph engine for cross-file liveness and chunk
//! analysis.
//!
//! This crate owns the hard part of Vestige: a shared, cyclic graph of
//! export bindings mutated in place across several traversal phases. It has
//! no filesystem or parser dependencies; a frontend feeds it lowered
//! [`construct::ModuleSummary`] values through the [`ModuleHost`] seam.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ProjectGraph                            │
//! │   (file store + binding arena, index-based aliasing)        │
//! └────────────────────┬────────────────────────────────────────┘
//!                      │
//!        ┌─────────┬───┴──────┬───────────┐
//!        ▼         ▼          ▼           ▼
//!   ┌─────────┐ ┌───────┐ ┌────────┐ ┌─────────┐
//!   │ Builder │ │Counter│ │Cascader│ │ Chunks  │
//!   │ (§graph │ │ (±1   │ │ (undo  │ │ (member │
//!   │  build) │ │ pass) │ │  pass) │ │  + size)│
//!   └─────────┘ └───────┘ └────────┘ └─────────┘
//! ```
//!
//! Bindings are shared by index, not by pointer: every importer of a
//! symbol holds the same [`arena::BindingId`], so a usage increment made
//! while analyzing one file is visible from every file that can reach the
//! binding. Aliasing an export (`export { x } from`, `export *`,
//! `import * as ns`) copies an index.
//!
//! Import graphs cycle in practice, so every traversal here — the
//! builder's post-order export stage, entry tainting, the dead-file
//! cascade, chunk membership, aggregate size — runs on an explicit stack or
//! worklist and marks state before descending.

pub mod arena;
pub mod builder;
pub mod chunks;
pub mod construct;
pub mod counter;
pub mod dead;
pub mod graph;
pub mod host;
pub mod stats;

pub use arena::{
    Binding, BindingId, ConsumerCounts, FileId, FileKind, FileRecord, DEFAULT_EXPORT,
    MODULE_CONTAINER,
};
pub use builder::{build_address_graph, build_binding_graph, chunk_tag_for, TraversalMode};
pub use chunks::{
    compute_chunk_membership, files_in_multiple_chunks, AggregateSizeEngine, ChunkAggregate,
    ChunkGraph, ChunkGraphNode,
};
pub use construct::{
    Construct, ImportBinding, ImportClause, ImportKind, ModuleSummary, ReferenceKind,
    SymbolReference,
};
pub use counter::{count_usage, Delta};
pub use dead::{find_dead_files, is_dead, DeadFileEntry};
pub use graph::ProjectGraph;
pub use host::{ModuleHost, Resolved};
pub use stats::GraphStats;

/// Error types for graph operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The traversal discovered more files than the engine will hold.
    #[error("Graph has {file_count} files, max allowed is {max_allowed}")]
    GraphTooLarge {
        file_count: usize,
        max_allowed: usize,
    },
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, Error>;
