//! StarQuery Core
//!
//! Core types and interfaces for the StarQuery indexing and query engine:
//! the per-file structural facts, file kinds, classification, and the
//! label/path conventions shared by every other crate.

pub mod classifier;
pub mod config;
pub mod error;
pub mod filekind;
pub mod label;
pub mod types;

pub use classifier::{ChainClassifier, Classification, Classifier, DefaultClassifier};
pub use error::{Error, Result};
pub use filekind::{is_starlark_file, Dialect, FileKind};
pub use label::{has_hidden_dir, module_to_path, normalize_path};
pub use types::*;
