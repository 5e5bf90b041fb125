//! Query evaluation

use std::collections::HashSet;
use std::sync::Arc;

use starquery_core::File;
use starquery_index::Index;
use tracing::debug;

use crate::ast::{Expr, SetOp};
use crate::error::{QueryError, Result};
use crate::item::{Item, QueryResult};
use crate::parser::parse;
use crate::sets::{difference, intersection, union};

/// Evaluates queries against an [`Index`]
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    pub(crate) index: &'a Index,
}

impl<'a> Engine<'a> {
    pub fn new(index: &'a Index) -> Self {
        Self { index }
    }

    /// Parse and evaluate a query string
    pub fn eval_str(&self, query: &str) -> Result<QueryResult> {
        let expr = parse(query)?;
        debug!("Evaluating {}", expr);
        self.eval(&expr)
    }

    pub fn eval(&self, expr: &Expr) -> Result<QueryResult> {
        match expr {
            Expr::Pattern(pattern) => self.files_matching(pattern),
            // Only meaningful as an argument
            Expr::Str(_) => Ok(QueryResult::new()),
            Expr::Call { function, args } => self.eval_call(function, args),
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(match op {
                    SetOp::Union => union(Some(&left), Some(&right)),
                    SetOp::Difference => difference(Some(&left), Some(&right)),
                    SetOp::Intersection => intersection(Some(&left), Some(&right)),
                })
            }
        }
    }

    /// Dispatch a built-in. Its result holds each fact at most once.
    fn eval_call(&self, function: &str, args: &[Expr]) -> Result<QueryResult> {
        let result = match function {
            "files" => self.eval_files(args),
            "defs" => self.eval_defs(args),
            "loads" => self.eval_loads(args),
            "calls" => self.eval_calls(args),
            "assigns" => self.eval_assigns(args),
            "filter" => self.eval_filter(args),
            "loadedby" => self.eval_loadedby(args),
            "allloads" => self.eval_allloads(args),
            _ => Err(QueryError::UnknownFunction(function.to_string())),
        }?;
        Ok(QueryResult::deduped(result.into_items()))
    }

    pub(crate) fn files_matching(&self, pattern: &str) -> Result<QueryResult> {
        let files = self.index.match_files(pattern)?;
        Ok(files.into_iter().map(Item::File).collect())
    }

    /// Evaluate `expr` and collect the distinct files its items live in,
    /// in first-seen order
    pub(crate) fn files_from_expr(&self, expr: &Expr) -> Result<Vec<Arc<File>>> {
        let result = self.eval(expr)?;

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for item in &result {
            match item {
                Item::File(file) => {
                    if seen.insert(file.path.clone()) {
                        files.push(file.clone());
                    }
                }
                other => {
                    let path = other.file();
                    if path.is_empty() || seen.contains(path) {
                        continue;
                    }
                    if let Some(file) = self.index.get(path) {
                        seen.insert(path.to_string());
                        files.push(file);
                    }
                }
            }
        }
        Ok(files)
    }
}
