//! File classification
//!
//! Maps a path to its dialect and file kind. The index only consumes the
//! [`Classifier`] trait, so callers can plug in workspace-aware
//! classification (e.g. telling Buck2 `.bzl` files apart from Bazel ones).

use std::path::Path;

use crate::error::{Error, Result};
use crate::filekind::{Dialect, FileKind};

/// Result of classifying a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub dialect: Dialect,
    pub kind: FileKind,
}

impl Classification {
    pub fn new(dialect: Dialect, kind: FileKind) -> Self {
        Self { dialect, kind }
    }

    /// Generic Starlark, used when nothing more specific is known
    pub fn generic() -> Self {
        Self::new(Dialect::Starlark, FileKind::Starlark)
    }
}

/// Determines the dialect and kind of a file
pub trait Classifier: Send + Sync {
    /// Classify an absolute or workspace-relative path
    fn classify(&self, path: &str) -> Result<Classification>;

    /// Whether this classifier handles the named dialect
    fn supports_dialect(&self, dialect: &str) -> bool;
}

/// Filename/extension based classifier
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultClassifier;

impl DefaultClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for DefaultClassifier {
    fn classify(&self, path: &str) -> Result<Classification> {
        let base = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::UnsupportedFile(path.to_string()))?;

        let by_name = match base {
            "BUILD" | "BUILD.bazel" => Some((Dialect::Bazel, FileKind::Build)),
            "WORKSPACE" | "WORKSPACE.bazel" => Some((Dialect::Bazel, FileKind::Workspace)),
            "MODULE.bazel" => Some((Dialect::Bazel, FileKind::Module)),
            "BUCK" => Some((Dialect::Buck2, FileKind::Buck)),
            "Tiltfile" => Some((Dialect::Starlark, FileKind::Starlark)),
            _ => None,
        };
        if let Some((dialect, kind)) = by_name {
            return Ok(Classification::new(dialect, kind));
        }

        let ext = Path::new(base)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let (dialect, kind) = match ext {
            "bzl" => (Dialect::Bazel, FileKind::Bzl),
            "bxl" => (Dialect::Buck2, FileKind::BzlBuck),
            // Please build files behave like BUILD files
            "plz" => (Dialect::Starlark, FileKind::Build),
            "star" | "starlark" | "sky" | "axl" | "ipd" | "pconf" | "pinc" | "mpconf" => {
                (Dialect::Starlark, FileKind::Starlark)
            }
            "skyi" => (Dialect::Starlark, FileKind::SkyI),
            _ => (Dialect::Starlark, FileKind::Unknown),
        };
        Ok(Classification::new(dialect, kind))
    }

    fn supports_dialect(&self, dialect: &str) -> bool {
        matches!(dialect, "bazel" | "buck2" | "starlark")
    }
}

/// Tries each classifier in order, returning the first success
pub struct ChainClassifier {
    classifiers: Vec<Box<dyn Classifier>>,
}

impl ChainClassifier {
    pub fn new(classifiers: Vec<Box<dyn Classifier>>) -> Self {
        Self { classifiers }
    }
}

impl Classifier for ChainClassifier {
    fn classify(&self, path: &str) -> Result<Classification> {
        let mut last_err = None;
        for classifier in &self.classifiers {
            match classifier.classify(path) {
                Ok(class) => return Ok(class),
                Err(e) => last_err = Some(e),
            }
        }
        match last_err {
            Some(e) => Err(e),
            None => Ok(Classification::new(Dialect::Starlark, FileKind::Unknown)),
        }
    }

    fn supports_dialect(&self, dialect: &str) -> bool {
        self.classifiers.iter().any(|c| c.supports_dialect(dialect))
    }
}
