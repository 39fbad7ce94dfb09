//! Error taxonomy shared by every archgen crate

use std::path::PathBuf;
use thiserror::Error;

/// Coarse failure categories; they decide whether a failure aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing credentials, malformed references, unsupported options. Fatal.
    Configuration,
    /// Unreadable files, failed listings, repository host failures. Fatal in local mode.
    Io,
    /// Model provider, reply parsing or validation failures. Never fatal.
    Enhancement,
    /// SVG/PNG export failures. Fatal for that export.
    Rendering,
}

/// archgen error types
#[derive(Error, Debug)]
pub enum ArchgenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Remote repository error: {0}")]
    Remote(String),

    #[error("Enhancement failed: {0}")]
    Enhancement(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for archgen operations
pub type Result<T> = std::result::Result<T, ArchgenError>;

impl ArchgenError {
    pub fn config(msg: impl Into<String>) -> Self {
        ArchgenError::Config(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchgenError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        ArchgenError::Remote(msg.into())
    }

    pub fn enhancement(msg: impl Into<String>) -> Self {
        ArchgenError::Enhancement(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        ArchgenError::Render(msg.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ArchgenError::Config(_) => ErrorCategory::Configuration,
            ArchgenError::Io { .. } | ArchgenError::Remote(_) => ErrorCategory::Io,
            ArchgenError::Enhancement(_) => ErrorCategory::Enhancement,
            ArchgenError::Render(_) => ErrorCategory::Rendering,
            ArchgenError::Json(_) => ErrorCategory::Io,
        }
    }

    /// Whether this failure must abort the whole command.
    pub fn is_fatal(&self) -> bool {
        self.category() != ErrorCategory::Enhancement
    }
}
