//! Batch runner: one full build of every selected pipeline.
//!
//! The pipelines share no data, so they run concurrently on the current task
//! and the runner waits for all of them before reporting. What a failure
//! means for the process is decided by the caller's [`FailurePolicy`].

use std::sync::Arc;

use appforge_core::{BuildConfig, BuildFailure, BuildOutcome, Pipeline};
use appforge_styles::StyleCompiler;

use crate::assets::copy_assets;
use crate::scripts::build_scripts;
use crate::styles::build_styles;

/// Which pipelines a batch run includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipelines {
    pub scripts: bool,
    pub styles: bool,
    pub assets: bool,
}

impl Pipelines {
    /// Full one-shot build.
    pub const ALL: Pipelines = Pipelines {
        scripts: true,
        styles: true,
        assets: true,
    };

    /// Pre-step before watch mode; the compiler's own watch mode performs the
    /// initial script build.
    pub const WITHOUT_SCRIPTS: Pipelines = Pipelines {
        scripts: false,
        styles: true,
        assets: true,
    };
}

/// What a call site does with pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Any failure ends the process with the failure's exit code.
    Terminate,
    /// Failures are logged and the caller carries on.
    LogAndContinue,
}

/// What the caller should do after a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    Exit(i32),
}

impl FailurePolicy {
    pub fn disposition(self, report: &BatchReport) -> Disposition {
        match (self, report.exit_code()) {
            (_, 0) | (FailurePolicy::LogAndContinue, _) => Disposition::Continue,
            (FailurePolicy::Terminate, code) => Disposition::Exit(code),
        }
    }
}

/// Per-pipeline outcomes of one batch run. `None` = pipeline not selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub scripts: Option<BuildOutcome>,
    pub styles: Option<BuildOutcome>,
    pub assets: Option<BuildOutcome>,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &BuildFailure> {
        [&self.scripts, &self.styles, &self.assets]
            .into_iter()
            .filter_map(|outcome| outcome.as_ref().and_then(|o| o.as_ref().err()))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// `0` on success. A script failure wins and contributes the compiler's
    /// own code; any other failure maps to `1`.
    pub fn exit_code(&self) -> i32 {
        if let Some(Err(failure)) = &self.scripts {
            return failure.exit_code();
        }
        match self.failures().next() {
            Some(failure) => failure.exit_code(),
            None => 0,
        }
    }
}

/// Run the selected pipelines concurrently and wait for all of them.
///
/// Every failure is logged here; deciding whether it is fatal is left to
/// [`FailurePolicy::disposition`].
pub async fn run_once(
    config: &BuildConfig,
    compiler: Arc<dyn StyleCompiler>,
    pipelines: Pipelines,
) -> BatchReport {
    let scripts = async {
        if pipelines.scripts {
            Some(build_scripts(config).await)
        } else {
            None
        }
    };
    let styles = async {
        if pipelines.styles {
            Some(build_styles(config, compiler).await)
        } else {
            None
        }
    };
    let assets = async {
        if pipelines.assets {
            Some(copy_assets(config).await)
        } else {
            None
        }
    };

    let (scripts, styles, assets) = tokio::join!(scripts, styles, assets);
    let report = BatchReport {
        scripts,
        styles,
        assets,
    };
    for failure in report.failures() {
        log_failure(failure);
    }
    report
}

fn log_failure(failure: &BuildFailure) {
    match failure.pipeline {
        Pipeline::Script => tracing::error!("{failure} (exit code {})", failure.exit_code()),
        Pipeline::Style | Pipeline::Asset => tracing::error!("{failure}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appforge_core::FailureKind;

    fn failure(pipeline: Pipeline, code: Option<i32>) -> BuildOutcome {
        let kind = match code {
            Some(code) => FailureKind::Process {
                program: "tsc".to_string(),
                code: Some(code),
                detail: String::new(),
            },
            None => FailureKind::Compile {
                message: "bad".to_string(),
            },
        };
        Err(BuildFailure::new(pipeline, kind))
    }

    #[test]
    fn all_ok_is_exit_zero() {
        let report = BatchReport {
            scripts: Some(Ok(())),
            styles: Some(Ok(())),
            assets: None,
        };
        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(
            FailurePolicy::Terminate.disposition(&report),
            Disposition::Continue
        );
    }

    #[test]
    fn script_code_wins_over_style_failure() {
        let report = BatchReport {
            scripts: Some(failure(Pipeline::Script, Some(2))),
            styles: Some(failure(Pipeline::Style, None)),
            assets: Some(Ok(())),
        };
        assert_eq!(report.exit_code(), 2);
        assert_eq!(report.failures().count(), 2);
    }

    #[test]
    fn style_failure_exits_one() {
        let report = BatchReport {
            scripts: Some(Ok(())),
            styles: Some(failure(Pipeline::Style, None)),
            assets: Some(Ok(())),
        };
        assert_eq!(
            FailurePolicy::Terminate.disposition(&report),
            Disposition::Exit(1)
        );
    }

    #[test]
    fn log_and_continue_never_exits() {
        let report = BatchReport {
            scripts: Some(failure(Pipeline::Script, Some(3))),
            styles: None,
            assets: None,
        };
        assert_eq!(
            FailurePolicy::LogAndContinue.disposition(&report),
            Disposition::Continue
        );
    }
}
