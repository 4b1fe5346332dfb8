//! End-to-end frontend tests over real files on disk.

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vestige_core::AnalysisConfig;
use vestige_js::{chunk_report, chunk_size_report, dead_file_report, dependency_report};

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn config(root: &Path, entries: &[&str]) -> AnalysisConfig {
    AnalysisConfig {
        project_root: root.to_path_buf(),
        entries: entries.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

#[test]
fn dead_file_analysis_finds_orphans_and_cascades() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "src/main.ts",
        r#"
import { greet } from "./greet";
console.log(greet("world"));
"#,
    );
    write(
        root,
        "src/greet.ts",
        r#"export function greet(name: string) { return `hi ${name}`; }"#,
    );
    // Dead: nothing imports it, and it is the only importer of helper.
    write(
        root,
        "src/orphan.ts",
        r#"
import { helper } from "./helper";
export function orphan() { return helper(); }
"#,
    );
    write(root, "src/helper.ts", r#"export function helper() { return 1; }"#);

    let report = dead_file_report(&config(root, &["src/main.ts"])).unwrap();

    let dead: Vec<String> = report
        .dead
        .iter()
        .map(|d| {
            d.path
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert!(dead.contains(&"orphan.ts".to_string()));
    assert!(dead.contains(&"helper.ts".to_string()));
    assert!(!dead.contains(&"main.ts".to_string()));
    assert!(!dead.contains(&"greet.ts".to_string()));

    assert_eq!(report.stats.parse_failures, 0);
    assert_eq!(report.stats.files_checked, 4);
}

#[test]
fn unused_sibling_export_does_not_kill_the_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "src/main.ts",
        r#"
import { foo } from "./m";
foo();
"#,
    );
    write(
        root,
        "src/m.ts",
        r#"
export function foo() {}
export function bar() {}
"#,
    );

    let report = dead_file_report(&config(root, &["src/main.ts"])).unwrap();
    assert!(report.dead.is_empty());
}

#[test]
fn re_export_alone_does_not_keep_a_file_alive() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(root, "src/main.ts", r#"import "./barrel";"#);
    write(root, "src/barrel.ts", r#"export { x } from "./m";"#);
    write(root, "src/m.ts", r#"export const x = 1;"#);

    let report = dead_file_report(&config(root, &["src/main.ts"])).unwrap();
    let dead: Vec<String> = report
        .dead
        .iter()
        .map(|d| d.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(dead.contains(&"barrel.ts".to_string()));
    assert!(dead.contains(&"m.ts".to_string()));
}

#[test]
fn parse_failures_are_reported_not_fatal() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(root, "src/main.ts", r#"import { ok } from "./good"; ok();"#);
    write(root, "src/good.ts", r#"export const ok = () => {};"#);
    write(root, "src/bad.ts", "const ((( nope");

    let report = dead_file_report(&config(root, &["src/main.ts"])).unwrap();
    assert_eq!(report.stats.parse_failures, 1);
    // The broken file is unused, so it still shows up dead.
    assert!(report
        .dead
        .iter()
        .any(|d| d.path.file_name().unwrap() == "bad.ts"));
}

#[test]
fn chunk_analysis_reports_files_in_multiple_chunks() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "src/main.ts",
        r#"
import { shared } from "./shared";
const admin = import(/* webpackChunkName: "admin" */ "./panel");
shared();
"#,
    );
    write(
        root,
        "src/panel.ts",
        r#"
import { shared } from "./shared";
export function panel() { return shared(); }
"#,
    );
    write(root, "src/shared.ts", r#"export function shared() { return 1; }"#);

    let report = chunk_report(&config(root, &["src/main.ts"])).unwrap();

    assert_eq!(report.shared.len(), 1);
    assert!(report.shared[0].path.ends_with("src/shared.ts"));
    let mut chunks = report.shared[0].chunks.clone();
    chunks.sort();
    assert_eq!(chunks, vec!["admin".to_string(), "main".to_string()]);

    assert!(report.chunk_names.contains(&"main".to_string()));
    assert!(report.chunk_names.contains(&"admin".to_string()));
}

#[test]
fn chunk_size_covers_the_static_closure_only() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "src/entry.ts",
        r#"
import { a } from "./a";
import("./lazy");
a();
"#,
    );
    write(root, "src/a.ts", r#"export function a() { return "aaaa"; }"#);
    write(root, "src/lazy.ts", r#"export const huge = "x".repeat(10000);"#);

    let report = chunk_size_report(&config(root, &["src/entry.ts"]), Path::new("src/entry.ts"))
        .unwrap();

    assert_eq!(report.members.len(), 2);
    assert!(report.total_bytes > 0);
    assert!(report
        .members
        .iter()
        .all(|m| !m.ends_with("src/lazy.ts")));
}

#[test]
fn dependency_report_respects_max_depth() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(root, "src/main.ts", r#"import "./one";"#);
    write(root, "src/one.ts", r#"import "./two";"#);
    write(root, "src/two.ts", r#"export const two = 2;"#);

    let mut shallow = config(root, &["src/main.ts"]);
    shallow.max_depth = Some(1);
    let report = dependency_report(&shallow).unwrap();
    let names: Vec<String> = report
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names.contains(&"main.ts".to_string()));
    assert!(names.contains(&"one.ts".to_string()));
    assert!(!names.contains(&"two.ts".to_string()));

    let deep = config(root, &["src/main.ts"]);
    let report = dependency_report(&deep).unwrap();
    assert_eq!(report.files.len(), 3);
}

#[test]
fn commonjs_modules_participate_in_the_graph() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "src/main.cjs",
        r#"
const { helper } = require("./util.cjs");
helper();
"#,
    );
    write(
        root,
        "src/util.cjs",
        r#"
function helper() { return 1; }
function unused() { return 2; }
module.exports = { helper, unused };
"#,
    );
    write(
        root,
        "src/dead.cjs",
        r#"module.exports = { gone: () => 1 };"#,
    );

    let report = dead_file_report(&config(root, &["src/main.cjs"])).unwrap();
    let dead: Vec<String> = report
        .dead
        .iter()
        .map(|d| d.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(dead.contains(&"dead.cjs".to_string()));
    assert!(!dead.contains(&"util.cjs".to_string()));
}
