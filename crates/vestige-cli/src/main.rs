//! Vestige CLI - Dead file and chunk analyzer for JavaScript/TypeScript.

mod formatters;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vestige_core::{AnalysisConfig, ConfigFile};

#[derive(Parser, Debug)]
#[command(name = "vestige")]
#[command(about = "Dead file and chunk analyzer for JavaScript/TypeScript", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Project root to analyze
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Entry files or globs, relative to the project root
    ///
    /// Entry files are public surface: their exports stay live regardless
    /// of reference counts. Can be specified multiple times.
    #[arg(short, long = "entry", value_name = "PATH", global = true)]
    entries: Vec<String>,

    /// Glob patterns to exclude from analysis (can be specified multiple
    /// times)
    #[arg(long = "exclude", value_name = "PATTERN", global = true)]
    exclude: Vec<String>,

    /// Output format
    #[arg(short, long = "output", value_enum, global = true, default_value = "human")]
    format: OutputFormat,

    /// Verbose output
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find files no entry point reaches
    Dead,
    /// Find files that land in more than one chunk
    Chunks,
    /// Aggregate minified size of the chunk rooted at a file
    Size {
        /// The chunk root, relative to the project root
        entry: PathBuf,
    },
    /// List the import graph from the entry points
    Graph {
        /// Maximum import distance from an entry point
        #[arg(long)]
        depth: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AnalysisConfig {
        project_root: cli.root.clone(),
        entries: cli.entries.clone(),
        exclude: cli.exclude.clone(),
        ..Default::default()
    };
    ConfigFile::load(&cli.root)?.apply(&mut config);

    match &cli.command {
        Command::Dead => {
            let report = vestige_js::dead_file_report(&config)?;
            match cli.format {
                OutputFormat::Human => formatters::human::print_dead(&report),
                OutputFormat::Json => formatters::json::print(&report)?,
            }
        }
        Command::Chunks => {
            let report = vestige_js::chunk_report(&config)?;
            match cli.format {
                OutputFormat::Human => formatters::human::print_chunks(&report),
                OutputFormat::Json => formatters::json::print(&report)?,
            }
        }
        Command::Size { entry } => {
            let report = vestige_js::chunk_size_report(&config, entry)?;
            match cli.format {
                OutputFormat::Human => formatters::human::print_size(&report),
                OutputFormat::Json => formatters::json::print(&report)?,
            }
        }
        Command::Graph { depth } => {
            if depth.is_some() {
                config.max_depth = *depth;
            }
            let report = vestige_js::dependency_report(&config)?;
            match cli.format {
                OutputFormat::Human => formatters::human::print_graph(&report),
                OutputFormat::Json => formatters::json::print(&report)?,
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
