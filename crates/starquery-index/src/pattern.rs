//! File pattern grammar
//!
//! Both filesystem discovery and in-memory matching accept the same pattern
//! language. Parsing it once into a [`FilePattern`] keeps the two
//! interpretations from drifting apart.
//!
//! | Pattern            | Meaning                                          |
//! |--------------------|--------------------------------------------------|
//! | `//...`            | every Starlark file under the root               |
//! | `//pkg/...`        | every Starlark file under `pkg`                  |
//! | `//pkg:file.bzl`   | one file, or the direct children of a directory  |
//! | `**/suffix`        | files anywhere whose name matches `suffix`       |
//! | `*.bzl`, `a/*.bzl` | glob over the root-relative path                 |
//! | `pkg/BUILD`        | one file, relative to the root                   |
//! | `@repo//...`       | external repository, always empty                |

use globset::{GlobBuilder, GlobMatcher};
use starquery_core::{normalize_path, Error, Result};

/// A parsed file pattern
#[derive(Debug, Clone)]
pub enum FilePattern {
    /// `//...`
    All,
    /// `//pkg/...`, holding the normalized package directory
    Recursive(String),
    /// `//pkg:file` or `//path/to/file`, resolved to a relative path that
    /// may name a file or a directory (`""` is the root)
    Target(String),
    /// `**/suffix`
    AnyDepth(NameMatcher),
    /// Glob over the root-relative path
    Glob(PathGlob),
    /// Plain relative path
    Path(String),
    /// `@repo//...`
    External,
}

/// Base-name matcher for `**/suffix`
#[derive(Debug, Clone)]
pub enum NameMatcher {
    /// `*.ext`, stored with its leading dot
    Extension(String),
    Glob(GlobMatcher),
}

impl NameMatcher {
    pub fn is_match(&self, name: &str) -> bool {
        match self {
            NameMatcher::Extension(ext) => name.ends_with(ext.as_str()),
            NameMatcher::Glob(glob) => glob.is_match(name),
        }
    }
}

/// Compiled path glob
#[derive(Debug, Clone)]
pub struct PathGlob {
    matcher: GlobMatcher,
    /// Deepest directory level a match can live at; `None` with `**`
    max_depth: Option<usize>,
}

impl PathGlob {
    pub fn is_match(&self, rel: &str) -> bool {
        self.matcher.is_match(rel)
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }
}

const GLOB_META: &[char] = &['*', '?', '[', '{'];

impl FilePattern {
    /// Parse a pattern string. Only malformed glob syntax is an error.
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.starts_with('@') {
            return Ok(FilePattern::External);
        }

        if let Some(rest) = pattern.strip_prefix("//") {
            if rest == "..." {
                return Ok(FilePattern::All);
            }
            if let Some(pkg) = rest.strip_suffix("/...") {
                let pkg = normalize_path(pkg);
                return Ok(if pkg.is_empty() {
                    FilePattern::All
                } else {
                    FilePattern::Recursive(pkg)
                });
            }
            return Ok(FilePattern::Target(normalize_path(&rest.replace(':', "/"))));
        }

        if let Some(suffix) = pattern.strip_prefix("**/") {
            if suffix.contains('/') {
                return Ok(FilePattern::Glob(compile_path_glob(pattern)?));
            }
            if let Some(ext) = suffix.strip_prefix("*.") {
                if !ext.is_empty() && !ext.contains(GLOB_META) {
                    return Ok(FilePattern::AnyDepth(NameMatcher::Extension(format!(
                        ".{ext}"
                    ))));
                }
            }
            let glob = compile_glob(pattern, suffix)?;
            return Ok(FilePattern::AnyDepth(NameMatcher::Glob(glob)));
        }

        if pattern.contains(GLOB_META) {
            return Ok(FilePattern::Glob(compile_path_glob(pattern)?));
        }

        Ok(FilePattern::Path(normalize_path(pattern)))
    }
}

fn compile_glob(pattern: &str, glob: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.kind().to_string(),
        })
}

fn compile_path_glob(pattern: &str) -> Result<PathGlob> {
    let glob = normalize_path(pattern);
    let matcher = compile_glob(pattern, &glob)?;
    let max_depth = if glob.contains("**") {
        None
    } else {
        Some(glob.matches('/').count() + 1)
    };
    Ok(PathGlob { matcher, max_depth })
}
