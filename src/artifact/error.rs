//! Error types for artifact materialization.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while saving an artifact.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// File system error while staging or persisting the artifact.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Writing to standard output failed.
    #[error("error writing artifact to stdout: {source}")]
    Stdout {
        #[source]
        source: std::io::Error,
    },

    /// Every numbered variant of the filename is already taken.
    #[error("no free filename for {filename} in {dir}")]
    NamesExhausted { dir: PathBuf, filename: String },
}

impl MaterializeError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a stdout error.
    pub fn stdout(source: std::io::Error) -> Self {
        Self::Stdout { source }
    }
}
