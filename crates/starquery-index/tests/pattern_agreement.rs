//! Filesystem discovery and index matching must agree on every pattern
//! once the whole workspace is indexed.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use starquery_core::normalize_path;
use starquery_index::{discover, Index};

const FILES: &[&str] = &[
    "BUILD",
    "WORKSPACE",
    "defs.bzl",
    "notes.md",
    "lib/BUILD.bazel",
    "lib/utils.bzl",
    "lib/base.bzl",
    "lib/sub/extra.star",
    "lib/sub/deep/more.bzl",
    "lib/data.json",
    "app/MODULE.bazel",
    "app/BUCK",
    "app/rules.bxl",
    "tools/copy.bara.sky",
    ".hidden/secret.bzl",
    "lib/.cache/cached.bzl",
];

const PATTERNS: &[&str] = &[
    "//...",
    "//lib/...",
    "//lib/sub/...",
    "//.hidden/...",
    "//missing/...",
    "//lib:utils.bzl",
    "//lib/sub:extra.star",
    "//:defs.bzl",
    "//lib",
    "//lib/sub",
    "//lib:data.json",
    "//lib/.cache",
    "//lib:nope.bzl",
    "*.bzl",
    "lib/*.bzl",
    "lib/**/*.bzl",
    "**/*.bzl",
    "**/*.bara.sky",
    "**/BUILD*",
    "**/BUCK",
    "**/more.bzl",
    "lib/utils.bzl",
    "lib/data.json",
    "@repo//lib/...",
];

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for rel in FILES {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x = 1\n").unwrap();
    }
    dir
}

fn discovered(pattern: &str, root: &Path) -> Vec<String> {
    let mut found: Vec<String> = discover(pattern, root)
        .unwrap()
        .iter()
        .map(|p| normalize_path(&p.strip_prefix(root).unwrap().to_string_lossy()))
        .collect();
    found.sort();
    found
}

#[test]
fn discovery_and_index_agree() {
    let ws = workspace();
    let index = Index::new(ws.path());
    for rel in FILES {
        // Index everything, including files discovery would skip
        let _ = index.add(rel);
    }

    for pattern in PATTERNS {
        let from_index: Vec<String> = index
            .match_files(pattern)
            .unwrap()
            .iter()
            .map(|f| f.path.clone())
            .collect();
        assert_eq!(
            discovered(pattern, ws.path()),
            from_index,
            "pattern {pattern}"
        );
    }
}

#[test]
fn hidden_directories_skipped_recursively() {
    let ws = workspace();
    let all = discovered("//...", ws.path());
    assert!(!all.iter().any(|p| p.contains(".hidden") || p.contains(".cache")));
    assert_eq!(all.len(), 12);

    // Named explicitly, hidden directories are still reachable
    assert_eq!(discovered("//.hidden/...", ws.path()), vec![".hidden/secret.bzl"]);
    assert_eq!(discovered("//lib/.cache", ws.path()), vec!["lib/.cache/cached.bzl"]);
}

#[cfg(unix)]
#[test]
fn symlinked_files_agree() {
    use std::os::unix::fs::symlink;

    let ws = tempfile::tempdir().unwrap();
    let root = ws.path();
    fs::create_dir_all(root.join("real")).unwrap();
    fs::create_dir_all(root.join("pkg")).unwrap();
    fs::write(root.join("real/defs.bzl"), "def f():\n    pass\n").unwrap();
    symlink(root.join("real/defs.bzl"), root.join("pkg/defs.bzl")).unwrap();

    let index = Index::new(root);
    let (count, errors) = index.add_pattern("//...");
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(count, 2);

    for pattern in ["//...", "//pkg/...", "//pkg", "//pkg:defs.bzl", "**/*.bzl"] {
        let from_index: Vec<String> = index
            .match_files(pattern)
            .unwrap()
            .iter()
            .map(|f| f.path.clone())
            .collect();
        assert_eq!(discovered(pattern, root), from_index, "pattern {pattern}");
    }
    assert_eq!(
        discovered("//...", root),
        vec!["pkg/defs.bzl", "real/defs.bzl"]
    );
}
