use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the watch session.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("channel closed: {0}")]
    ChannelClosed(&'static str),

    #[error("nothing to watch: none of the source roots exist")]
    NoRoots,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> WatchError {
    WatchError::Io {
        path: path.into(),
        source,
    }
}
