//! StarQuery Query Engine
//!
//! A small query language over the structural index:
//!
//! ```text
//! defs(//lib/...)                        function definitions under lib/
//! calls(cc_library, //...)               call sites of cc_library
//! filter("^_", defs(//...))              private definitions
//! loadedby("//lib:defs.bzl")             files loading a module
//! allloads(//pkg:BUILD)                  transitive loads of a file
//! defs(//a/...) + defs(//b/...)          set union (also `-` and `^`)
//! ```

pub mod ast;
pub mod engine;
pub mod error;
mod funcs;
pub mod item;
pub mod output;
pub mod parser;
pub mod sets;

pub use ast::{Expr, SetOp};
pub use engine::Engine;
pub use error::{QueryError, Result, SyntaxError, SyntaxErrorKind};
pub use item::{Item, ItemKey, ItemType, QueryResult};
pub use output::{Formatter, OutputFormat};
pub use parser::parse;
pub use sets::{difference, intersection, union};
