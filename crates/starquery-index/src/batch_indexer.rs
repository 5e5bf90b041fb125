//! Batch Indexer
//!
//! Runs the per-file indexing step over a discovered file set, either on
//! the rayon pool or sequentially, and gathers the partial-failure outcome.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use starquery_core::{Error, Result};
use tracing::{debug, info, warn};

/// Outcome of indexing a batch of files
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Files indexed successfully
    pub indexed: usize,
    /// One error per failed file, in path order
    pub errors: Vec<Error>,
}

/// Batch indexer for processing multiple files
#[derive(Debug, Clone, Copy)]
pub struct BatchIndexer {
    parallel: bool,
}

impl BatchIndexer {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    /// Apply `index_one` to every path. A failing file never stops the
    /// others from being indexed.
    pub fn run<F>(&self, paths: &[PathBuf], index_one: F) -> BatchOutcome
    where
        F: Fn(&Path) -> Result<()> + Sync,
    {
        debug!(
            "Indexing {} files ({})",
            paths.len(),
            if self.parallel { "parallel" } else { "sequential" }
        );

        let results: Vec<Result<()>> = if self.parallel {
            paths.par_iter().map(|p| index_one(p)).collect()
        } else {
            paths.iter().map(|p| index_one(p)).collect()
        };

        let mut outcome = BatchOutcome::default();
        for result in results {
            match result {
                Ok(()) => outcome.indexed += 1,
                Err(e) => {
                    warn!("{}", e);
                    outcome.errors.push(e);
                }
            }
        }

        info!(
            "Indexed {} files, {} failed",
            outcome.indexed,
            outcome.errors.len()
        );
        outcome
    }
}

impl Default for BatchIndexer {
    fn default() -> Self {
        Self::new(true)
    }
}
