//! Error types for StarQuery

use std::path::PathBuf;
use thiserror::Error;

/// StarQuery error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("{0} is outside the workspace root")]
    OutsideRoot(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),
}

/// Result type alias for StarQuery
pub type Result<T> = std::result::Result<T, Error>;
