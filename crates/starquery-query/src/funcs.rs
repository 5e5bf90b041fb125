//! Built-in query functions

use std::collections::BTreeMap;

use regex::Regex;
use starquery_core::{module_to_path, Load};

use crate::ast::Expr;
use crate::engine::Engine;
use crate::error::{QueryError, Result};
use crate::item::{Item, QueryResult};

fn check_arity(function: &str, args: &[Expr], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(QueryError::Arity {
            function: function.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

/// A pattern or string argument taken literally
fn literal_arg<'e>(function: &str, expr: &'e Expr, what: &str) -> Result<&'e str> {
    match expr {
        Expr::Pattern(p) => Ok(p.as_str()),
        Expr::Str(s) => Ok(s.as_str()),
        other => Err(QueryError::ArgumentType {
            function: function.to_string(),
            message: format!("expected {what}, got {}", other.kind_name()),
        }),
    }
}

impl Engine<'_> {
    /// `files(pattern)`
    pub(crate) fn eval_files(&self, args: &[Expr]) -> Result<QueryResult> {
        check_arity("files", args, 1)?;
        let pattern = literal_arg("files", &args[0], "pattern or string")?;
        self.files_matching(pattern)
    }

    /// `defs(expr)`
    pub(crate) fn eval_defs(&self, args: &[Expr]) -> Result<QueryResult> {
        check_arity("defs", args, 1)?;
        let files = self.files_from_expr(&args[0])?;
        Ok(files
            .iter()
            .flat_map(|f| f.defs.iter().cloned().map(Item::Def))
            .collect())
    }

    /// `loads(expr)`
    pub(crate) fn eval_loads(&self, args: &[Expr]) -> Result<QueryResult> {
        check_arity("loads", args, 1)?;
        let files = self.files_from_expr(&args[0])?;
        Ok(files
            .iter()
            .flat_map(|f| f.loads.iter().cloned().map(Item::Load))
            .collect())
    }

    /// `calls(function, expr)`; `*` matches every callee
    pub(crate) fn eval_calls(&self, args: &[Expr]) -> Result<QueryResult> {
        check_arity("calls", args, 2)?;
        let function = literal_arg("calls", &args[0], "function name or pattern")?;
        let files = self.files_from_expr(&args[1])?;
        Ok(files
            .iter()
            .flat_map(|f| f.calls.iter())
            .filter(|call| function == "*" || call.function == function)
            .cloned()
            .map(Item::Call)
            .collect())
    }

    /// `assigns(expr)`
    pub(crate) fn eval_assigns(&self, args: &[Expr]) -> Result<QueryResult> {
        check_arity("assigns", args, 1)?;
        let files = self.files_from_expr(&args[0])?;
        Ok(files
            .iter()
            .flat_map(|f| f.assigns.iter().cloned().map(Item::Assign))
            .collect())
    }

    /// `filter("regex", expr)` keeps items whose name matches
    pub(crate) fn eval_filter(&self, args: &[Expr]) -> Result<QueryResult> {
        check_arity("filter", args, 2)?;
        let Expr::Str(pattern) = &args[0] else {
            return Err(QueryError::ArgumentType {
                function: "filter".into(),
                message: format!(
                    "first argument must be a string pattern, got {}",
                    args[0].kind_name()
                ),
            });
        };
        let re = Regex::new(pattern).map_err(|source| QueryError::InvalidRegex {
            pattern: pattern.clone(),
            source,
        })?;

        let result = self.eval(&args[1])?;
        Ok(result
            .into_iter()
            .filter(|item| re.is_match(item.name()))
            .collect())
    }

    /// `loadedby(module)`: files that directly load the module label
    pub(crate) fn eval_loadedby(&self, args: &[Expr]) -> Result<QueryResult> {
        check_arity("loadedby", args, 1)?;
        let module = literal_arg("loadedby", &args[0], "module label")?;
        let graph = self.index.build_load_graph();
        Ok(graph
            .loaded_by(module)
            .iter()
            .filter_map(|path| self.index.get(path))
            .map(Item::File)
            .collect())
    }

    /// `allloads(expr)`: transitive load closure of every file in `expr`
    pub(crate) fn eval_allloads(&self, args: &[Expr]) -> Result<QueryResult> {
        check_arity("allloads", args, 1)?;
        let files = self.files_from_expr(&args[0])?;
        let graph = self.index.build_load_graph();

        Ok(files
            .iter()
            .flat_map(|f| graph.all_loads(&f.path))
            .map(|label| {
                Item::Load(Load {
                    file: module_to_path(&label),
                    module: label,
                    symbols: BTreeMap::new(),
                    line: 1,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starquery_index::Index;
    use std::fs;
    use std::path::Path;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn indexed() -> (tempfile::TempDir, Index) {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "lib/defs.bzl",
            r#"
VERSION = "1.0"

def public_rule(name):
    pass

def _private_helper():
    pass
"#,
        );
        write(
            dir.path(),
            "pkg/BUILD",
            r#"
load("//lib:defs.bzl", "public_rule")

public_rule(name = "a")
public_rule(name = "b")
native.genrule(name = "c")
"#,
        );
        let index = Index::new(dir.path());
        let (_, errors) = index.add_pattern("//...");
        assert!(errors.is_empty(), "{errors:?}");
        (dir, index)
    }

    #[test]
    fn test_files() {
        let (_dir, index) = indexed();
        let engine = Engine::new(&index);
        assert_eq!(
            engine.eval_str("files(//...)").unwrap().names(),
            vec!["lib/defs.bzl", "pkg/BUILD"]
        );
        assert_eq!(
            engine.eval_str("files(\"//pkg:BUILD\")").unwrap().names(),
            vec!["pkg/BUILD"]
        );
        assert!(engine.eval_str("files(//nonexistent/...)").unwrap().is_empty());
    }

    #[test]
    fn test_defs_loads_assigns() {
        let (_dir, index) = indexed();
        let engine = Engine::new(&index);
        assert_eq!(
            engine.eval_str("defs(//...)").unwrap().names(),
            vec!["public_rule", "_private_helper"]
        );
        assert_eq!(
            engine.eval_str("loads(//pkg/...)").unwrap().names(),
            vec!["//lib:defs.bzl"]
        );
        assert_eq!(
            engine.eval_str("assigns(//lib/...)").unwrap().names(),
            vec!["VERSION"]
        );
    }

    #[test]
    fn test_calls() {
        let (_dir, index) = indexed();
        let engine = Engine::new(&index);
        assert_eq!(engine.eval_str("calls(public_rule, //...)").unwrap().len(), 2);
        assert_eq!(
            engine.eval_str("calls(\"native.genrule\", //...)").unwrap().len(),
            1
        );
        assert_eq!(engine.eval_str("calls(*, //...)").unwrap().len(), 3);
        assert!(engine.eval_str("calls(genrule, //...)").unwrap().is_empty());
    }

    #[test]
    fn test_items_resolve_back_to_files() {
        let (_dir, index) = indexed();
        let engine = Engine::new(&index);
        // pkg/BUILD has no assignments
        assert!(engine
            .eval_str("assigns(calls(public_rule, //...))")
            .unwrap()
            .is_empty());
        assert_eq!(
            engine.eval_str("loads(calls(*, //...))").unwrap().names(),
            vec!["//lib:defs.bzl"]
        );
    }

    #[test]
    fn test_same_line_calls_collapse() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pkg/BUILD", "f(); f()\ng()\n");
        let index = Index::new(dir.path());
        index.add("pkg/BUILD").unwrap();
        assert_eq!(index.get("pkg/BUILD").unwrap().calls.len(), 3);

        let engine = Engine::new(&index);
        let calls = engine.eval_str("calls(*, //pkg/...)").unwrap();
        assert_eq!(calls.names(), vec!["f", "g"]);
        assert_eq!(engine.eval_str("calls(f, //...)").unwrap().len(), 1);
        assert_eq!(
            engine.eval_str("filter(\"f\", calls(*, //...))").unwrap().len(),
            1
        );
    }

    #[test]
    fn test_filter() {
        let (_dir, index) = indexed();
        let engine = Engine::new(&index);
        assert_eq!(
            engine.eval_str("filter(\"^_\", defs(//...))").unwrap().names(),
            vec!["_private_helper"]
        );
        assert!(matches!(
            engine.eval_str("filter(\"[\", defs(//...))"),
            Err(QueryError::InvalidRegex { .. })
        ));
        assert!(matches!(
            engine.eval_str("filter(pattern, defs(//...))"),
            Err(QueryError::ArgumentType { .. })
        ));
    }

    #[test]
    fn test_argument_validation() {
        let (_dir, index) = indexed();
        let engine = Engine::new(&index);
        for (query, function, expected, got) in [
            ("files()", "files", 1, 0),
            ("defs(//a/..., //b/...)", "defs", 1, 2),
            ("calls(foo)", "calls", 2, 1),
            ("filter(\"x\")", "filter", 2, 1),
            ("loadedby()", "loadedby", 1, 0),
        ] {
            match engine.eval_str(query) {
                Err(QueryError::Arity {
                    function: f,
                    expected: e,
                    got: g,
                }) => {
                    assert_eq!((f.as_str(), e, g), (function, expected, got), "{query}");
                }
                other => panic!("{query}: unexpected {other:?}"),
            }
        }

        assert!(matches!(
            engine.eval_str("files(defs(//...))"),
            Err(QueryError::ArgumentType { .. })
        ));
        assert!(matches!(
            engine.eval_str("bogus(//...)"),
            Err(QueryError::UnknownFunction(name)) if name == "bogus"
        ));
    }
}
