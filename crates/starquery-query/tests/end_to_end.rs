//! End-to-end queries over real workspaces on disk

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use starquery_core::Arg;
use starquery_index::Index;
use starquery_query::{Engine, Item, QueryError};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn index_all(dir: &TempDir) -> Index {
    let index = Index::new(dir.path());
    let (_, errors) = index.add_pattern("//...");
    assert!(errors.is_empty(), "{errors:?}");
    index
}

fn lib_workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "lib/base.bzl",
        "def base_function():\n    pass\n",
    );
    write(
        dir.path(),
        "lib/utils.bzl",
        r#"load("//lib:base.bzl", "base_function")

def my_function(name):
    base_function()
"#,
    );
    dir
}

#[test]
fn defs_under_package() {
    let dir = lib_workspace();
    let index = index_all(&dir);
    let result = Engine::new(&index).eval_str("defs(//lib/...)").unwrap();

    assert_eq!(result.names(), vec!["base_function", "my_function"]);
    assert!(result.iter().all(|i| matches!(i, Item::Def(_))));
}

#[test]
fn calls_with_keyword_args() {
    let dir = lib_workspace();
    write(
        dir.path(),
        "pkg/BUILD.bazel",
        r#"load("//lib:utils.bzl", "my_function")

my_function(name = "t1")
"#,
    );
    let index = index_all(&dir);
    let result = Engine::new(&index)
        .eval_str("calls(my_function, //...)")
        .unwrap();

    assert_eq!(result.len(), 1);
    match &result.items()[0] {
        Item::Call(call) => {
            assert_eq!(call.file, "pkg/BUILD.bazel");
            assert_eq!(call.line, 3);
            assert_eq!(call.args, vec![Arg::keyword("name", "t1")]);
        }
        other => panic!("unexpected item {other:?}"),
    }
}

fn cycle_workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "cycle/a.bzl", "load(\"//cycle:b.bzl\", \"b\")\na = 1\n");
    write(dir.path(), "cycle/b.bzl", "load(\"//cycle:c.bzl\", \"c\")\nb = 1\n");
    write(dir.path(), "cycle/c.bzl", "load(\"//cycle:a.bzl\", \"a\")\nc = 1\n");
    dir
}

#[test]
fn allloads_terminates_on_cycle() {
    let dir = cycle_workspace();
    let index = index_all(&dir);
    let result = Engine::new(&index)
        .eval_str("allloads(//cycle/a.bzl)")
        .unwrap();

    assert_eq!(
        result.names(),
        vec!["//cycle:b.bzl", "//cycle:c.bzl", "//cycle:a.bzl"]
    );
}

#[test]
fn detect_cycles_reports_loop() {
    let dir = cycle_workspace();
    let index = index_all(&dir);
    let cycles = index.build_load_graph().detect_cycles();

    assert_eq!(
        cycles,
        vec![vec!["cycle/a.bzl", "cycle/b.bzl", "cycle/c.bzl", "cycle/a.bzl"]]
    );
}

#[test]
fn union_has_no_duplicates() {
    let dir = lib_workspace();
    write(dir.path(), "pkg/defs.bzl", "def pkg_rule():\n    pass\n");
    let index = index_all(&dir);
    let engine = Engine::new(&index);

    let union = engine.eval_str("defs(//lib/...) + defs(//pkg/...)").unwrap();
    assert_eq!(
        union.names(),
        vec!["base_function", "my_function", "pkg_rule"]
    );

    let overlapping = engine.eval_str("defs(//lib/...) + defs(//...)").unwrap();
    assert_eq!(overlapping.len(), 3);

    let difference = engine.eval_str("defs(//...) - defs(//lib/...)").unwrap();
    assert_eq!(difference.names(), vec!["pkg_rule"]);

    let intersection = engine.eval_str("defs(//...) ^ defs(//pkg/...)").unwrap();
    assert_eq!(intersection.names(), vec!["pkg_rule"]);
}

#[test]
fn filter_private_defs() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "defs.bzl",
        "def _helper():\n    pass\n\ndef helper():\n    pass\n",
    );
    let index = index_all(&dir);
    let result = Engine::new(&index)
        .eval_str("filter(\"^_\", defs(//...))")
        .unwrap();

    assert_eq!(result.names(), vec!["_helper"]);
}

#[test]
fn nonexistent_package_is_empty() {
    let dir = lib_workspace();
    let index = index_all(&dir);
    let result = Engine::new(&index)
        .eval_str("files(//nonexistent/...)")
        .unwrap();
    assert!(result.is_empty());
}

#[test]
fn loadedby_and_allloads_compose() {
    let dir = lib_workspace();
    write(
        dir.path(),
        "pkg/BUILD.bazel",
        r#"load("//lib:utils.bzl", "my_function")
load("@rules_cc//cc:defs.bzl", "cc_library")

my_function(name = "t1")
"#,
    );
    write(
        dir.path(),
        "other/BUILD",
        "load(\"//lib:utils.bzl\", \"my_function\")\n",
    );
    let index = index_all(&dir);
    let engine = Engine::new(&index);

    assert_eq!(
        engine
            .eval_str("loadedby(\"//lib:utils.bzl\")")
            .unwrap()
            .names(),
        vec!["other/BUILD", "pkg/BUILD.bazel"]
    );
    assert_eq!(
        engine.eval_str("loadedby(//lib:base.bzl)").unwrap().names(),
        vec!["lib/utils.bzl"]
    );

    let closure = engine.eval_str("allloads(//pkg:BUILD.bazel)").unwrap();
    assert_eq!(
        closure.names(),
        vec!["//lib:utils.bzl", "//lib:base.bzl", "@rules_cc//cc:defs.bzl"]
    );
    let files: Vec<&str> = closure.iter().map(|i| i.file()).collect();
    assert_eq!(files, vec!["lib/utils.bzl", "lib/base.bzl", ""]);

    // Shared dependencies of several starting files appear once
    let shared = engine
        .eval_str("allloads(//pkg:BUILD.bazel + //other:BUILD)")
        .unwrap();
    assert_eq!(shared.len(), 3);

    // Loaded modules resolve back to their files
    assert_eq!(
        engine
            .eval_str("defs(allloads(//pkg:BUILD.bazel))")
            .unwrap()
            .names(),
        vec!["my_function", "base_function"]
    );
}

#[test]
fn reindexing_replaces_facts() {
    let dir = lib_workspace();
    let index = index_all(&dir);
    let engine = Engine::new(&index);
    assert_eq!(engine.eval_str("defs(//lib:base.bzl)").unwrap().len(), 1);

    write(
        dir.path(),
        "lib/base.bzl",
        "def one():\n    pass\n\ndef two():\n    pass\n",
    );
    index.add("lib/base.bzl").unwrap();
    assert_eq!(
        engine.eval_str("defs(//lib:base.bzl)").unwrap().names(),
        vec!["one", "two"]
    );
}

#[test]
fn errors_are_reported_not_panicked() {
    let dir = lib_workspace();
    let index = index_all(&dir);
    let engine = Engine::new(&index);

    assert!(matches!(
        engine.eval_str("defs(//lib/..."),
        Err(QueryError::Syntax(_))
    ));
    assert!(matches!(
        engine.eval_str("nope(//...)"),
        Err(QueryError::UnknownFunction(_))
    ));
    assert!(matches!(
        engine.eval_str("files(\"lib/[*.bzl\")"),
        Err(QueryError::Index(_))
    ));
    assert!(engine.eval_str("\"just a string\"").unwrap().is_empty());
}
