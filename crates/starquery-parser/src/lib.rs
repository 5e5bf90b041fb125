//! StarQuery Parser
//!
//! Parsing of Starlark-family files with tree-sitter, and extraction of the
//! flat per-file record the index stores.
//!
//! ## Modules
//!
//! - `treesitter` - Tree-sitter backed [`Parser`] for every Starlark kind
//! - `ast` - Parsed syntax tree wrapper and literal helpers
//! - `extract` - Top-level Def/Load/Call/Assign extraction

pub mod ast;
pub mod extract;
pub mod treesitter;

pub use ast::SyntaxTree;
pub use extract::extract_file;

use starquery_core::{FileKind, Result};

/// Parser trait for different backends
pub trait Parser: Send + Sync {
    /// Parse source bytes of a file of the given kind into a syntax tree.
    ///
    /// Syntax errors are reported as errors; a tree is only returned for
    /// a file that parsed cleanly.
    fn parse(&self, source: &[u8], path: &str, kind: FileKind) -> Result<SyntaxTree>;

    /// Whether this backend can parse files of `kind`
    fn supports_kind(&self, kind: FileKind) -> bool;

    /// Get parser name
    fn name(&self) -> &str;
}

/// Get the default parser
pub fn get_parser() -> Box<dyn Parser> {
    Box::new(treesitter::TreeSitterParser::new())
}
