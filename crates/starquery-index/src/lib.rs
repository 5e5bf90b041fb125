//! StarQuery Index
//!
//! Owns the in-memory path -> [`File`] mapping for a workspace. Files are
//! added one at a time or by pattern; queries read consistent snapshots
//! through pattern matching against the indexed paths, and the load graph
//! is derived from the stored Loads on demand.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use starquery_core::config::IndexConfig;
use starquery_core::{
    has_hidden_dir, is_starlark_file, normalize_path, Classification, Classifier,
    DefaultClassifier, Error, File, Result,
};
use starquery_parser::{extract_file, get_parser, Parser};
use tracing::{debug, warn};

mod batch_indexer;
pub mod discovery;
pub mod graph;
pub mod pattern;

pub use batch_indexer::{BatchIndexer, BatchOutcome};
pub use discovery::discover;
pub use graph::LoadGraph;
pub use pattern::FilePattern;

/// Index of Starlark files under one workspace root
pub struct Index {
    root: PathBuf,
    files: RwLock<HashMap<String, Arc<File>>>,
    classifier: Box<dyn Classifier>,
    parser: Box<dyn Parser>,
    config: IndexConfig,
}

impl Index {
    /// Create an empty index for `root` with the default classifier and
    /// parser
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, IndexConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: IndexConfig) -> Self {
        Self {
            root: root.into(),
            files: RwLock::new(HashMap::new()),
            classifier: Box::new(DefaultClassifier::new()),
            parser: get_parser(),
            config,
        }
    }

    /// Replace the file classifier
    pub fn with_classifier(mut self, classifier: Box<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the parser backend
    pub fn with_parser(mut self, parser: Box<dyn Parser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<File>>> {
        self.files.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<File>>> {
        self.files.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Root-relative, `/`-separated key. Absolute paths must live under the
    /// root; relative paths are always taken relative to it.
    fn relative_key(&self, path: &Path) -> Result<String> {
        let rel = if path.is_absolute() {
            path.strip_prefix(&self.root)
                .map_err(|_| Error::OutsideRoot(path.to_path_buf()))?
        } else {
            path
        };
        let key = normalize_path(&rel.to_string_lossy());
        if key.split('/').any(|seg| seg == "..") {
            return Err(Error::OutsideRoot(path.to_path_buf()));
        }
        Ok(key)
    }

    /// Read, classify, parse and extract one file. On success the File
    /// replaces any previous entry for the same path.
    pub fn add(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let key = self.relative_key(path)?;
        let full = self.root.join(&key);

        let source = std::fs::read(&full).map_err(|source| Error::Read {
            path: full.clone(),
            source,
        })?;

        let class = match self.classifier.classify(&key) {
            Ok(class) => class,
            Err(e) => {
                warn!("Classifying {} failed, treating as generic Starlark: {}", key, e);
                Classification::generic()
            }
        };

        let tree = self.parser.parse(&source, &key, class.kind)?;
        let file = extract_file(&tree, &key, class.kind);
        debug!(
            "Indexed {} ({}, {}): {} defs, {} loads, {} calls, {} assigns",
            key,
            class.dialect,
            class.kind,
            file.defs.len(),
            file.loads.len(),
            file.calls.len(),
            file.assigns.len()
        );

        self.write().insert(key, Arc::new(file));
        Ok(())
    }

    /// Discover files matching `pattern` under the root and add each one.
    ///
    /// Returns how many files were indexed and the errors of the ones that
    /// failed; a failing file never stops the batch. A malformed pattern is
    /// reported as the only error.
    pub fn add_pattern(&self, pattern: &str) -> (usize, Vec<Error>) {
        let paths = match discover(pattern, &self.root) {
            Ok(paths) => paths,
            Err(e) => return (0, vec![e]),
        };
        let paths: Vec<PathBuf> = paths
            .into_iter()
            .map(|p| match p.strip_prefix(&self.root) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => p,
            })
            .collect();
        let outcome = BatchIndexer::new(self.config.parallel).run(&paths, |p| self.add(p));
        (outcome.indexed, outcome.errors)
    }

    pub fn get(&self, path: &str) -> Option<Arc<File>> {
        self.read().get(&normalize_path(path)).cloned()
    }

    /// Snapshot of every indexed file, in no particular order
    pub fn files(&self) -> Vec<Arc<File>> {
        self.read().values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Indexed files matching `pattern`, sorted by path. Uses the same
    /// grammar as [`discover`] without touching the filesystem.
    pub fn match_files(&self, pattern: &str) -> Result<Vec<Arc<File>>> {
        let parsed = FilePattern::parse(pattern)?;
        let files = self.read();

        let mut matched: Vec<Arc<File>> = match &parsed {
            FilePattern::Target(target) => match files.get(target) {
                Some(file) => vec![file.clone()],
                None => files
                    .values()
                    .filter(|f| parent_dir(&f.path) == target.as_str())
                    .cloned()
                    .collect(),
            },
            _ => files
                .values()
                .filter(|f| path_matches(&parsed, &f.path))
                .cloned()
                .collect(),
        };
        drop(files);

        matched.retain(|f| is_starlark_file(base_name(&f.path)));
        matched.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(matched)
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("root", &self.root)
            .field("files", &self.count())
            .field("parser", &self.parser.name())
            .finish()
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Match an indexed path against every pattern shape except targets
fn path_matches(pattern: &FilePattern, path: &str) -> bool {
    match pattern {
        FilePattern::External | FilePattern::Target(_) => false,
        FilePattern::All => !has_hidden_dir(path),
        FilePattern::Recursive(pkg) => path
            .strip_prefix(pkg.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|rest| !has_hidden_dir(rest)),
        FilePattern::AnyDepth(names) => !has_hidden_dir(path) && names.is_match(base_name(path)),
        FilePattern::Glob(glob) => !has_hidden_dir(path) && glob.is_match(path),
        FilePattern::Path(rel) => path == rel,
    }
}
