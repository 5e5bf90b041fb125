//! Filesystem discovery
//!
//! Expands a file pattern against a workspace root into the Starlark
//! files it names. Only recognized Starlark files are ever returned, and
//! missing directories or files resolve to an empty set.

use std::io;
use std::path::{Path, PathBuf};

use starquery_core::{is_starlark_file, normalize_path, Error, Result};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::pattern::FilePattern;

/// Expand `pattern` against `root`.
///
/// Returned paths are `root` joined with the matched relative path, in
/// sorted order.
pub fn discover(pattern: &str, root: &Path) -> Result<Vec<PathBuf>> {
    let parsed = FilePattern::parse(pattern)?;
    let mut found = match &parsed {
        FilePattern::External => Vec::new(),
        FilePattern::All => walk(root, None, |_, _| true)?,
        FilePattern::Recursive(pkg) => {
            let base = root.join(pkg);
            if !base.is_dir() {
                Vec::new()
            } else {
                walk(&base, None, |_, _| true)?
            }
        }
        FilePattern::AnyDepth(names) => walk(root, None, |_, name| names.is_match(name))?,
        FilePattern::Glob(glob) => walk(root, glob.max_depth(), |rel, _| glob.is_match(rel))?,
        FilePattern::Target(target) => target_files(&root.join(target))?,
        FilePattern::Path(rel) => {
            let path = root.join(rel);
            if path.is_file() && file_name(&path).is_some_and(is_starlark_file) {
                vec![path]
            } else {
                Vec::new()
            }
        }
    };

    found.sort();
    debug!("Pattern {} matched {} files", pattern, found.len());
    Ok(found)
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Hidden directories below the walk root are never entered
fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(|n| n.starts_with('.'))
}

/// Regular files and links to files; directory links are never followed
fn is_file_entry(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

/// Walk `base` and keep Starlark files accepted by `keep(rel, name)`,
/// where `rel` is the `/`-separated path relative to `base`.
fn walk<F>(base: &Path, max_depth: Option<usize>, keep: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&str, &str) -> bool,
{
    let mut walker = WalkDir::new(base).sort_by_file_name();
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut found = Vec::new();
    for entry in walker.into_iter().filter_entry(|e| !is_hidden_dir(e)) {
        let entry = entry.map_err(io::Error::from)?;
        if !is_file_entry(&entry) {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !is_starlark_file(name) {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(base)
            .map(|p| normalize_path(&p.to_string_lossy()))
            .unwrap_or_default();
        if keep(&rel, name) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// A label target: the file itself, or the direct Starlark children of a
/// directory
fn target_files(path: &Path) -> Result<Vec<PathBuf>> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::Io(e)),
    };

    if meta.is_file() {
        return Ok(if file_name(path).is_some_and(is_starlark_file) {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut found = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let child = entry.path();
        let file_type = entry.file_type()?;
        let is_file = file_type.is_file() || (file_type.is_symlink() && child.is_file());
        if is_file && file_name(&child).is_some_and(is_starlark_file) {
            found.push(child);
        }
    }
    Ok(found)
}
