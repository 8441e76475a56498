//! Error types for hirematch operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used
//! across all hirematch crates. Uses `thiserror` for derive macros.
//!
//! Callers that need to react to a failure (for example to pick a response
//! status or an exit code) should branch on [`Error::kind`] rather than on
//! the message text.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::pool::Pool;

/// Errors that can occur in hirematch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error without path context.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a specific file.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// The file the operation was acting on.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested document pool was never loaded.
    #[error("{0} index not found. Place {index_file} & {meta_file} in the artifacts directory", index_file = .0.index_file_name(), meta_file = .0.metadata_file_name())]
    PoolUnavailable(Pool),

    /// The caller supplied an invalid or incomplete request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A lookup found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A model or index failed to load. Recorded once and reported on
    /// every later use of the resource set.
    #[error("Resource load failed: {0}")]
    ResourceLoad(String),

    /// Invalid data or format (corrupt artifacts, misaligned tables).
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Any other failure while encoding, searching or reranking.
    #[error("Operation failed: {0}")]
    Operation(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A pool's index/metadata pair is not loaded.
    ResourceUnavailable,
    /// The request was malformed; no model was invoked.
    InvalidInput,
    /// A lookup matched nothing.
    NoMatch,
    /// Everything else.
    Processing,
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a resource load error.
    pub fn resource_load(msg: impl Into<String>) -> Self {
        Self::ResourceLoad(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an operation error.
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Wrap an I/O error with the path it occurred on.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PoolUnavailable(_) => ErrorKind::ResourceUnavailable,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NoMatch,
            _ => ErrorKind::Processing,
        }
    }

    /// Returns `true` for [`ErrorKind::ResourceUnavailable`].
    pub fn is_unavailable(&self) -> bool {
        self.kind() == ErrorKind::ResourceUnavailable
    }

    /// Returns `true` for [`ErrorKind::NoMatch`].
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NoMatch
    }
}

/// Result type alias using hirematch's Error type.
pub type Result<T> = std::result::Result<T, Error>;
