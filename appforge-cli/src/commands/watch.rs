//! Continuous mode: initial style and asset build, then watch until ctrl-c.

use std::sync::Arc;

use anyhow::{Context, Result};

use appforge_build::{run_once, Disposition, FailurePolicy, Pipelines};
use appforge_core::BuildConfig;
use appforge_styles::StyleCompiler;
use appforge_watch::WatchSession;

pub async fn run(config: &BuildConfig, compiler: Arc<dyn StyleCompiler>) -> Result<()> {
    // Scripts get their first compile from the compiler's own watch mode.
    let report = run_once(config, Arc::clone(&compiler), Pipelines::WITHOUT_SCRIPTS).await;
    if let Disposition::Exit(code) = FailurePolicy::LogAndContinue.disposition(&report) {
        anyhow::bail!("initial build exited with {code}");
    }
    if !report.is_success() {
        tracing::warn!("initial build had failures, watching anyway");
    }

    let session =
        WatchSession::start(config, compiler).context("failed to start watch session")?;
    tracing::info!("watching for changes, press ctrl-c to stop");
    session.run().await.context("watch session failed")
}
