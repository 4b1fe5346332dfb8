//! Vestige Core - Shared configuration, error, and report types.
//!
//! This crate provides the vocabulary shared by Vestige's analysis layers:
//!
//! - [`AnalysisConfig`]: explicit per-run configuration (no global state)
//! - [`Error`] / [`Result`]: the common error taxonomy
//! - Report types ([`DeadFileReport`], [`ChunkReport`], [`ChunkSizeReport`],
//!   [`GraphReport`]) rendered by the CLI
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  vestige-cli    │  (User interface)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  vestige-core   │  (This crate - config, errors, reports)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │   vestige-js    │ ──▶ │  vestige-graph  │
//! │ (oxc frontend)  │     │ (binding graph) │
//! └─────────────────┘     └─────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod types;

// Re-export core types for convenience
pub use config::{AnalysisConfig, ConfigFile, DEFAULT_EXTENSIONS};
pub use error::{Error, Result};
pub use types::{
    ChunkMembership, ChunkReport, ChunkSizeReport, DeadFile, DeadFileReport, FileEdges,
    GraphReport, RunStats,
};
