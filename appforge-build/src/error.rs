//! Error types for appforge-build.

use std::path::PathBuf;

use thiserror::Error;

use appforge_core::{BuildFailure, FailureKind, Pipeline};
use appforge_styles::StyleError;

/// All errors that can arise inside a build pipeline.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An error from style aggregation.
    #[error("style error: {0}")]
    Style(#[from] StyleError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external program exited unsuccessfully. `code` is `None` when it
    /// was terminated by a signal.
    #[error("{program} exited with {}", describe_code(.code))]
    Exit { program: String, code: Option<i32> },

    /// A blocking worker task died before reporting.
    #[error("worker task for {path} failed: {detail}")]
    Task { path: PathBuf, detail: String },
}

impl BuildError {
    /// Convert into the domain-level failure for `pipeline`.
    pub fn into_failure(self, pipeline: Pipeline) -> BuildFailure {
        let kind = match self {
            BuildError::Style(StyleError::Compile { path, message }) => FailureKind::Compile {
                message: format!("{}: {message}", path.display()),
            },
            BuildError::Style(StyleError::Io { path, source })
            | BuildError::Io { path, source } => FailureKind::Filesystem {
                path,
                detail: source.to_string(),
            },
            BuildError::Spawn { program, source } => FailureKind::Process {
                program,
                code: None,
                detail: format!("could not be started: {source}"),
            },
            BuildError::Exit { program, code } => FailureKind::Process {
                program,
                code,
                detail: format!("exited with {}", describe_code(&code)),
            },
            BuildError::Task { path, detail } => FailureKind::Filesystem { path, detail },
        };
        BuildFailure::new(pipeline, kind)
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Convenience constructor for [`BuildError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> BuildError {
    BuildError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`BuildError::Task`].
pub(crate) fn task_err(path: impl Into<PathBuf>, err: tokio::task::JoinError) -> BuildError {
    BuildError::Task {
        path: path.into(),
        detail: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_maps_to_process_failure_with_code() {
        let failure = BuildError::Exit {
            program: "tsc".to_string(),
            code: Some(2),
        }
        .into_failure(Pipeline::Script);
        assert_eq!(failure.exit_code(), 2);
        assert!(failure.to_string().contains("tsc exited with code 2"), "{failure}");
    }

    #[test]
    fn compile_error_keeps_path_in_message() {
        let failure = BuildError::Style(StyleError::Compile {
            path: PathBuf::from("/p/scss/bad.scss"),
            message: "expected \"}\"".to_string(),
        })
        .into_failure(Pipeline::Style);
        match failure.kind {
            FailureKind::Compile { message } => assert!(message.contains("bad.scss")),
            other => panic!("unexpected kind: {other:?}"),
        }
        assert_eq!(failure.pipeline, Pipeline::Style);
    }

    #[test]
    fn io_maps_to_filesystem() {
        let failure = io_err(
            "/p/src",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        )
        .into_failure(Pipeline::Asset);
        assert!(matches!(failure.kind, FailureKind::Filesystem { .. }));
        assert_eq!(failure.exit_code(), 1);
    }
}
