//! Hygiene — enforces coding standards at test time.
//!
//! Scans the crate's production sources for antipatterns. Every pattern has
//! a budget of zero; if you must add an occurrence, fix an existing one
//! first so the budget never grows.

use std::fs;
use std::path::Path;

/// (pattern, budget, why it is banned)
const BUDGETS: &[(&str, usize, &str)] = &[
    (".unwrap()", 0, "crashes the process; propagate or handle"),
    (".expect(", 0, "crashes the process; propagate or handle"),
    ("panic!(", 0, "crashes the process"),
    ("unreachable!(", 0, "crashes the process"),
    ("todo!(", 0, "unfinished code"),
    ("unimplemented!(", 0, "unfinished code"),
    ("let _ =", 0, "silently discards a result"),
    (".ok()", 0, "silently discards an error"),
    ("#[allow(dead_code)]", 0, "hides unused code instead of removing it"),
];

struct SourceFile {
    path: String,
    content: String,
}

/// Production `.rs` files under `src/`, excluding `*_test.rs` siblings.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect(Path::new("src"), &mut files);
    assert!(!files.is_empty(), "no source files found; run from the crate root");
    files
}

fn collect(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, out);
            continue;
        }
        if path.extension().is_none_or(|e| e != "rs") {
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|l| l.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn pattern_budgets_hold() {
    let files = source_files();
    let mut report = String::new();
    for (pattern, budget, why) in BUDGETS {
        let found = hits(&files, pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > *budget {
            report.push_str(&format!("`{pattern}` ({why}): found {count}, max {budget}\n"));
            for (path, c) in &found {
                report.push_str(&format!("  {path}: {c}\n"));
            }
        }
    }
    assert!(report.is_empty(), "hygiene budgets exceeded:\n{report}");
}
