//! One-shot mode: build everything once and report through the exit code.

use std::sync::Arc;

use appforge_build::{run_once, Disposition, FailurePolicy, Pipelines};
use appforge_core::BuildConfig;
use appforge_styles::StyleCompiler;

/// Run every pipeline once. Returns the process exit code.
pub async fn run(config: &BuildConfig, compiler: Arc<dyn StyleCompiler>) -> i32 {
    let report = run_once(config, compiler, Pipelines::ALL).await;
    match FailurePolicy::Terminate.disposition(&report) {
        Disposition::Continue => {
            tracing::info!("build finished");
            0
        }
        Disposition::Exit(code) => code,
    }
}
