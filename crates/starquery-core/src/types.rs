//! Core type definitions
//!
//! One [`File`] per indexed source file, holding the flat lists of
//! top-level facts found in it. Every fact carries the root-relative path
//! of its file and the 1-based line where it starts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::filekind::FileKind;

/// A parsed Starlark file with its extracted structural facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Path relative to the workspace root, always `/`-separated
    pub path: String,
    /// Kind of Starlark file (BUILD, bzl, star, ...)
    pub kind: FileKind,
    /// Top-level function definitions
    pub defs: Vec<Def>,
    /// Load statements
    pub loads: Vec<Load>,
    /// Top-level call expressions (excluding `load`)
    pub calls: Vec<Call>,
    /// Top-level assignments, one entry per bound name
    pub assigns: Vec<Assign>,
}

impl File {
    /// Create an empty file record
    pub fn new(path: impl Into<String>, kind: FileKind) -> Self {
        Self {
            path: path.into(),
            kind,
            defs: Vec::new(),
            loads: Vec::new(),
            calls: Vec::new(),
            assigns: Vec::new(),
        }
    }
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Def {
    /// Function name
    pub name: String,
    /// File containing the definition
    pub file: String,
    /// Line of the `def` keyword (1-based)
    pub line: u32,
    /// Parameter names in order; varargs keep their `*` / `**` prefix
    pub params: Vec<String>,
    /// Docstring, empty when absent
    pub docstring: String,
}

/// Load statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Load {
    /// Loaded module label, e.g. `//lib:utils.bzl` or `@repo//pkg:file.bzl`
    pub module: String,
    /// Local alias -> exported name.
    ///
    /// For `load("//lib:utils.bzl", "foo", bar = "baz")` this holds
    /// `foo -> foo` and `bar -> baz`.
    pub symbols: BTreeMap<String, String>,
    /// File containing the load statement
    pub file: String,
    /// Line of the statement (1-based)
    pub line: u32,
}

/// Top-level function call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Called function, possibly dotted (`native.cc_library`)
    pub function: String,
    /// Arguments in source order
    pub args: Vec<Arg>,
    /// File containing the call
    pub file: String,
    /// Line of the call (1-based)
    pub line: u32,
}

/// Call argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    /// Keyword name, `None` for positional arguments
    pub name: Option<String>,
    /// Best-effort source rendering of the value
    pub value: String,
}

impl Arg {
    /// Positional argument
    pub fn positional(value: impl Into<String>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    /// Keyword argument
    pub fn keyword(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }
}

/// Top-level assignment of a single name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assign {
    /// Bound name
    pub name: String,
    /// File containing the assignment
    pub file: String,
    /// Line of the assignment statement (1-based)
    pub line: u32,
}
