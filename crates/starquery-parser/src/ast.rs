//! Parsed syntax tree and literal helpers

use starquery_core::FileKind;
use tree_sitter::{Node, Tree};

/// A cleanly parsed Starlark file
pub struct SyntaxTree {
    tree: Tree,
    source: String,
    kind: FileKind,
}

impl SyntaxTree {
    pub(crate) fn new(tree: Tree, source: String, kind: FileKind) -> Self {
        Self { tree, source, kind }
    }

    /// The `module` node
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Source text covered by `node`
    pub fn text(&self, node: Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or("")
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("kind", &self.kind)
            .field("root", &self.root().to_sexp())
            .finish()
    }
}

/// 1-based line of a node
pub fn line_of(node: Node<'_>) -> u32 {
    node.start_position().row as u32 + 1
}

/// Decode the value of a string literal token such as `"a\tb"`,
/// `r'raw'` or `"""doc"""`.
pub fn string_literal_value(literal: &str) -> String {
    let quote_start = literal
        .find(|c| c == '"' || c == '\'')
        .unwrap_or(literal.len());
    let (prefix, quoted) = literal.split_at(quote_start);
    let raw = prefix.contains(['r', 'R']);

    let body = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|q| {
            quoted
                .strip_prefix(q)
                .map(|rest| rest.strip_suffix(q).unwrap_or(rest))
        })
        .unwrap_or(quoted);

    if raw {
        body.to_string()
    } else {
        unescape(body)
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            // Line continuation inside a string
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
