//! Domain types for the appforge build orchestrator.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The build category a source path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Compiled by the external script compiler.
    Script,
    /// Aggregated into the single stylesheet.
    Style,
    /// Mirrored verbatim into the output tree.
    Asset,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Script => write!(f, "script"),
            Domain::Style => write!(f, "style"),
            Domain::Asset => write!(f, "asset"),
        }
    }
}

/// Stylesheet output density, selected by the compress flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputDensity {
    /// Expanded output with a provenance comment per source.
    #[default]
    Readable,
    /// Compressed output, no provenance comments.
    Compact,
}

impl OutputDensity {
    pub fn from_compress_flag(compress: bool) -> Self {
        if compress {
            OutputDensity::Compact
        } else {
            OutputDensity::Readable
        }
    }

    pub fn is_compact(self) -> bool {
        self == OutputDensity::Compact
    }
}

/// One of the three build pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pipeline {
    Script,
    Style,
    Asset,
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pipeline::Script => write!(f, "scripts"),
            Pipeline::Style => write!(f, "styles"),
            Pipeline::Asset => write!(f, "assets"),
        }
    }
}

// ---------------------------------------------------------------------------
// Classified paths
// ---------------------------------------------------------------------------

/// An absolute source path tagged with its domain and its path relative to
/// the root that owns it. Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPath {
    pub path: PathBuf,
    pub domain: Domain,
    pub relative: PathBuf,
}

impl ClassifiedPath {
    /// Mirrored location of this path under `output_root`.
    pub fn destination(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.relative)
    }
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

/// What went wrong inside a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    /// An external process exited unsuccessfully or could not be started.
    #[error("{program} {detail}")]
    Process {
        program: String,
        code: Option<i32>,
        detail: String,
    },

    /// The style compiler rejected a source.
    #[error("{message}")]
    Compile { message: String },

    /// A file or directory operation failed.
    #[error("{path}: {detail}")]
    Filesystem { path: PathBuf, detail: String },
}

/// A tagged pipeline failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{pipeline} failed: {kind}")]
pub struct BuildFailure {
    pub pipeline: Pipeline,
    pub kind: FailureKind,
}

impl BuildFailure {
    pub fn new(pipeline: Pipeline, kind: FailureKind) -> Self {
        Self { pipeline, kind }
    }

    /// Process exit code this failure maps to: the external process's own code
    /// when it is positive, otherwise `1`.
    pub fn exit_code(&self) -> i32 {
        match self.kind {
            FailureKind::Process {
                code: Some(code), ..
            } if code > 0 => code,
            _ => 1,
        }
    }
}

/// Result of a single pipeline run.
pub type BuildOutcome = Result<(), BuildFailure>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn process_failure(code: Option<i32>) -> BuildFailure {
        BuildFailure::new(
            Pipeline::Script,
            FailureKind::Process {
                program: "tsc".to_string(),
                code,
                detail: "exited".to_string(),
            },
        )
    }

    #[test]
    fn exit_code_uses_positive_process_code() {
        assert_eq!(process_failure(Some(2)).exit_code(), 2);
    }

    #[test]
    fn exit_code_defaults_to_one() {
        assert_eq!(process_failure(None).exit_code(), 1);
        assert_eq!(process_failure(Some(-9)).exit_code(), 1);
        let compile = BuildFailure::new(
            Pipeline::Style,
            FailureKind::Compile {
                message: "expected \"}\"".to_string(),
            },
        );
        assert_eq!(compile.exit_code(), 1);
    }

    #[test]
    fn failure_display_names_pipeline() {
        let msg = process_failure(Some(2)).to_string();
        assert!(msg.starts_with("scripts failed"), "got: {msg}");
    }

    #[test]
    fn density_from_flag() {
        assert_eq!(OutputDensity::from_compress_flag(true), OutputDensity::Compact);
        assert!(!OutputDensity::from_compress_flag(false).is_compact());
    }

    #[test]
    fn destination_joins_relative_path() {
        let classified = ClassifiedPath {
            path: PathBuf::from("/p/src/icons/a.svg"),
            domain: Domain::Asset,
            relative: PathBuf::from("icons/a.svg"),
        };
        assert_eq!(
            classified.destination(Path::new("/p/app")),
            PathBuf::from("/p/app/icons/a.svg")
        );
    }
}
