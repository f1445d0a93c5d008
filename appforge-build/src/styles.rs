//! Style pipeline: aggregate every style source and write the stylesheet.

use std::sync::Arc;

use tokio::time::Instant;

use appforge_core::{BuildConfig, BuildOutcome, Pipeline};
use appforge_styles::{aggregate, StyleCompiler};

use crate::error::{io_err, task_err, BuildError};
use crate::writer::atomic_write;

/// Rebuild the whole stylesheet.
///
/// Discovery and compilation run on the blocking pool. Any compile failure
/// aborts before anything is written, so a previous stylesheet stays intact.
pub async fn build_styles(config: &BuildConfig, compiler: Arc<dyn StyleCompiler>) -> BuildOutcome {
    tracing::info!("> Transpiling styles...");
    let started = Instant::now();

    build_styles_inner(config, compiler)
        .await
        .map_err(|e| e.into_failure(Pipeline::Style))?;

    tracing::info!(
        "> Styles transpiled in {:.3}s!",
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

async fn build_styles_inner(
    config: &BuildConfig,
    compiler: Arc<dyn StyleCompiler>,
) -> Result<(), BuildError> {
    let owned = config.clone();
    let sheet = tokio::task::spawn_blocking(move || aggregate(&owned, compiler.as_ref()))
        .await
        .map_err(|e| task_err(&config.style_root, e))??;

    let rendered = sheet.render(config.density);

    tokio::fs::create_dir_all(&config.output_root)
        .await
        .map_err(|e| io_err(&config.output_root, e))?;
    atomic_write(&config.stylesheet_path(), &rendered).await
}
