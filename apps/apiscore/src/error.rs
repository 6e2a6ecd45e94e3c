//! Error types shared across loading, analysis, reporting, and config.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while acquiring a document, before any analyzer runs.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Remote documents are not supported: {0}")]
    Connection(String),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Invalid OpenAPI document: {0}")]
    Validation(String),

    #[error("Unresolvable reference: {0}")]
    Reference(String),
}

/// Failure of a single analyzer; turned into a synthetic issue by the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    #[error("{0}")]
    Failed(String),

    #[error("analyzer panicked: {0}")]
    Panicked(String),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error writing report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Unknown report format '{0}' (expected json|markdown|html|all)")]
    UnknownFormat(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

pub type LoadResult<T> = Result<T, LoadError>;
