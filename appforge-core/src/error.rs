//! Error types for appforge-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or validating a [`crate::BuildConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An explicitly requested config file did not exist.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// The config parsed but describes an unusable layout.
    #[error("invalid config: {0}")]
    Invalid(String),
}
