//! Error types for the build pipeline

use std::path::PathBuf;
use thiserror::Error;

use crate::error::BuildError;
use crate::tools::ToolError;

/// Errors that can occur during pipeline execution
///
/// Only [`PipelineError::Build`] is recoverable; the loader turns it into a module
/// that throws at evaluation time. Every other variant aborts the host build.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Recoverable build failure
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Tool could not be run
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// File access failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Wrap an I/O error with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The recoverable build error, if this is one
    pub fn as_build_error(&self) -> Option<&BuildError> {
        match self {
            Self::Build(e) => Some(e),
            _ => None,
        }
    }
}
