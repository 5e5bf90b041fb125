//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// StarQuery configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace root that index keys are relative to
    pub workspace: PathBuf,

    /// Index configuration
    pub index: IndexConfig,

    /// Output configuration
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            index: IndexConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Parse a YAML document; missing fields keep their defaults
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_yaml_str(&source)
    }
}

/// Index configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Parse and extract files of a pattern on the rayon pool
    pub parallel: bool,

    /// Keep going when some files fail to index
    pub keep_going: bool,

    /// Pattern indexed before a query runs
    pub initial_pattern: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            keep_going: false,
            initial_pattern: "//...".into(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format (name, location, json, count)
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "name".into(),
        }
    }
}
