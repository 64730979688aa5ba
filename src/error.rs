//! Error types shared by the configuration loader, the flag builder and the writers.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while loading the configuration or building flags
#[derive(Debug, Error)]
pub enum FlagError {
    #[error("could not read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config field `{field}` {expected}")]
    ConfigField { field: String, expected: &'static str },

    #[error("could not resolve project directory {path}: {source}")]
    ProjectDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The metadata tool could not be spawned at all.
    #[error("metadata tool `{tool}` unavailable for package {package}: {source}")]
    ToolUnavailable {
        tool: String,
        package: String,
        #[source]
        source: io::Error,
    },

    /// The metadata tool ran but reported a failure for this package.
    #[error("package {package} not found by `{tool}`: {stderr}")]
    PackageNotFound {
        tool: String,
        package: String,
        stderr: String,
    },

    #[error("`{tool}` returned non UTF-8 output for package {package}")]
    InvalidOutput { tool: String, package: String },

    #[error("could not walk {root}: {source}")]
    Walk {
        root: String,
        #[source]
        source: walkdir::Error,
    },

    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} already exists")]
    AlreadyExists(PathBuf),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlagError>;
