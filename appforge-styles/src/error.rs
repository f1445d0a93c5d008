//! Error types for appforge-styles.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while aggregating styles.
#[derive(Debug, Error)]
pub enum StyleError {
    /// The style compiler rejected a source.
    #[error("failed to compile {path}: {message}")]
    Compile { path: PathBuf, message: String },

    /// Filesystem error while discovering style sources.
    #[error("style io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StyleError {
    StyleError::Io {
        path: path.into(),
        source,
    }
}
