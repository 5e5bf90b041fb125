//! Starlark file kinds and dialects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Reserved file names recognized as Starlark regardless of extension
pub const STARLARK_FILENAMES: &[&str] = &[
    "BUILD",
    "BUILD.bazel",
    "WORKSPACE",
    "WORKSPACE.bazel",
    "MODULE.bazel",
    "BUCK",
    "Tiltfile",
];

/// Extensions (without the dot) recognized as Starlark
pub const STARLARK_EXTENSIONS: &[&str] = &[
    "bzl", "bxl", "star", "starlark", "sky", "skyi", "axl", "ipd", "plz", "pconf", "pinc",
    "mpconf",
];

/// Type of Starlark file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Generic `.star` file
    Starlark,
    /// Type stub (`.skyi`)
    SkyI,
    /// BUILD / BUILD.bazel
    Build,
    /// Bazel `.bzl` extension
    Bzl,
    /// WORKSPACE / WORKSPACE.bazel
    Workspace,
    /// MODULE.bazel
    Module,
    /// `.bzl` used as a bzlmod extension
    Bzlmod,
    /// Buck2 BUCK file
    Buck,
    /// Buck2 `.bzl` / `.bxl`
    BzlBuck,
    /// `.buckconfig`
    Buckconfig,
    Unknown,
}

impl FileKind {
    /// Top-level build files (BUILD, WORKSPACE, MODULE.bazel, BUCK)
    pub fn is_top_level(self) -> bool {
        matches!(
            self,
            FileKind::Build | FileKind::Workspace | FileKind::Module | FileKind::Buck
        )
    }

    /// Extension / library files (.bzl, .star)
    pub fn is_extension(self) -> bool {
        matches!(
            self,
            FileKind::Bzl | FileKind::BzlBuck | FileKind::Bzlmod | FileKind::Starlark
        )
    }

    pub fn is_bazel(self) -> bool {
        matches!(
            self,
            FileKind::Build
                | FileKind::Bzl
                | FileKind::Workspace
                | FileKind::Module
                | FileKind::Bzlmod
        )
    }

    pub fn is_buck(self) -> bool {
        matches!(self, FileKind::Buck | FileKind::BzlBuck | FileKind::Buckconfig)
    }

    /// Tag used in output and configuration
    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Starlark => "starlark",
            FileKind::SkyI => "skyi",
            FileKind::Build => "BUILD",
            FileKind::Bzl => "bzl",
            FileKind::Workspace => "WORKSPACE",
            FileKind::Module => "MODULE",
            FileKind::Bzlmod => "bzlmod",
            FileKind::Buck => "BUCK",
            FileKind::BzlBuck => "bzl_buck",
            FileKind::Buckconfig => "buckconfig",
            FileKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build-system family a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Bazel,
    Buck2,
    Starlark,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Bazel => "bazel",
            Dialect::Buck2 => "buck2",
            Dialect::Starlark => "starlark",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether a file name (not a path) is a recognized Starlark file
pub fn is_starlark_file(name: &str) -> bool {
    if STARLARK_FILENAMES.contains(&name) {
        return true;
    }
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| STARLARK_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}
