//! Tree-sitter based parser for Starlark
//!
//! Starlark is syntactically a subset of Python, so every Starlark kind
//! (BUILD, .bzl, .star, BUCK, ...) is parsed with the Python grammar.

use starquery_core::{Error, FileKind, Result};
use tracing::debug;
use tree_sitter::{Language, Node, Parser as TSParser};

use crate::ast::SyntaxTree;
use crate::Parser;

/// Tree-sitter based parser
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterParser;

impl TreeSitterParser {
    /// Create a new Tree-sitter parser for Starlark
    pub fn new() -> Self {
        Self
    }

    fn language() -> Language {
        tree_sitter_python::LANGUAGE.into()
    }
}

impl Parser for TreeSitterParser {
    fn parse(&self, source: &[u8], path: &str, kind: FileKind) -> Result<SyntaxTree> {
        if !self.supports_kind(kind) {
            return Err(Error::UnsupportedFile(format!("{path} ({kind})")));
        }

        let source = String::from_utf8_lossy(source).into_owned();

        // tree_sitter::Parser is not Sync; one per call keeps the backend shareable
        let mut parser = TSParser::new();
        parser
            .set_language(&Self::language())
            .map_err(|e| Error::Parse {
                path: path.to_string(),
                message: format!("failed to load Starlark grammar: {e}"),
            })?;

        let tree = parser.parse(&source, None).ok_or_else(|| Error::Parse {
            path: path.to_string(),
            message: "parser returned no tree".into(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let message = match first_error(root) {
                Some(node) => {
                    let pos = node.start_position();
                    if node.is_missing() {
                        format!(
                            "syntax error at {}:{}: missing {}",
                            pos.row + 1,
                            pos.column + 1,
                            node.kind()
                        )
                    } else {
                        format!("syntax error at {}:{}", pos.row + 1, pos.column + 1)
                    }
                }
                None => "syntax error".to_string(),
            };
            return Err(Error::Parse {
                path: path.to_string(),
                message,
            });
        }

        debug!("Parsed {} as {}", path, kind);
        Ok(SyntaxTree::new(tree, source, kind))
    }

    fn supports_kind(&self, kind: FileKind) -> bool {
        // .buckconfig is INI, not Starlark
        kind != FileKind::Buckconfig
    }

    fn name(&self) -> &str {
        "tree-sitter"
    }
}

/// Depth-first search for the first ERROR or MISSING node
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}
