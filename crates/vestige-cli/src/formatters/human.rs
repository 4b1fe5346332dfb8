//! Human-readable terminal output.

use super::format_bytes;
use vestige_core::{ChunkReport, ChunkSizeReport, DeadFileReport, GraphReport, RunStats};

const LIST_LIMIT: usize = 50;

pub fn print_dead(report: &DeadFileReport) {
    println!("\n🗑️  Dead files ({}):", report.dead.len());
    if report.dead.is_empty() {
        println!("    none — every file is reachable from an entry point");
    }
    for dead in report.dead.iter().take(LIST_LIMIT) {
        if dead.priority_score > 0 {
            println!(
                "    {} ({})",
                dead.path.display(),
                format_bytes(dead.priority_score)
            );
        } else {
            println!("    {}", dead.path.display());
        }
    }
    if report.dead.len() > LIST_LIMIT {
        println!("    ... and {} more", report.dead.len() - LIST_LIMIT);
    }
    print_stats(&report.stats);
}

pub fn print_chunks(report: &ChunkReport) {
    println!(
        "\n📦 Chunks ({}): {}",
        report.chunk_names.len(),
        report.chunk_names.join(", ")
    );
    println!("\n  Files in more than one chunk ({}):", report.shared.len());
    if report.shared.is_empty() {
        println!("    none — no file is pulled into several chunks");
    }
    for membership in report.shared.iter().take(LIST_LIMIT) {
        println!(
            "    {} → [{}]",
            membership.path.display(),
            membership.chunks.join(", ")
        );
    }
    if report.shared.len() > LIST_LIMIT {
        println!("    ... and {} more", report.shared.len() - LIST_LIMIT);
    }
    print_stats(&report.stats);
}

pub fn print_size(report: &ChunkSizeReport) {
    println!(
        "\n📏 Chunk rooted at {}: {} across {} files",
        report.entry.display(),
        format_bytes(report.total_bytes),
        report.members.len()
    );
    for member in report.members.iter().take(LIST_LIMIT) {
        println!("    {}", member.display());
    }
    if report.members.len() > LIST_LIMIT {
        println!("    ... and {} more", report.members.len() - LIST_LIMIT);
    }
    print_stats(&report.stats);
}

pub fn print_graph(report: &GraphReport) {
    println!("\n🕸️  Import graph ({} files):", report.files.len());
    for edges in &report.files {
        println!("    {}", edges.path.display());
        for import in &edges.imports {
            println!("      → {}", import.display());
        }
        for dynamic in &edges.dynamic {
            println!("      ⇢ {} (dynamic)", dynamic.display());
        }
    }
    print_stats(&report.stats);
}

fn print_stats(stats: &RunStats) {
    println!(
        "\n  Parsed {}/{} files in {} ms",
        stats.files_parsed, stats.files_checked, stats.duration_ms
    );
    if stats.parse_failures > 0 {
        println!(
            "  ⚠️  {} file(s) failed to parse and were analyzed as stubs",
            stats.parse_failures
        );
    }
    if stats.missing_bindings > 0 {
        println!(
            "  ⚠️  {} re-export(s) pointed at names missing from their source",
            stats.missing_bindings
        );
    }
}
