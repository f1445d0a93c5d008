//! appforge: front-end build orchestrator.
//!
//! # Usage
//!
//! ```text
//! appforge [--compress] [--config <FILE>] [--project-dir <DIR>]
//! appforge --watch [--compress] [--config <FILE>] [--project-dir <DIR>]
//! ```

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use appforge_core::{BuildConfig, OutputDensity};
use appforge_styles::{GrassCompiler, StyleCompiler};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "appforge",
    version,
    about = "Build scripts, styles and assets for a front-end project",
    long_about = None,
)]
struct Cli {
    /// Keep running and rebuild whatever changes.
    #[arg(short, long)]
    watch: bool,

    /// Compact output: no provenance comments, minified scripts.
    #[arg(short, long)]
    compress: bool,

    /// Configuration file (default: <project-dir>/appforge.yaml when present).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base directory for relative source and output roots.
    #[arg(long, value_name = "DIR", default_value = ".")]
    project_dir: PathBuf,
}

impl Cli {
    fn load_config(&self) -> Result<BuildConfig> {
        let project_dir = std::fs::canonicalize(&self.project_dir).with_context(|| {
            format!("project directory {} not found", self.project_dir.display())
        })?;
        let config = BuildConfig::load_at(&project_dir, self.config.as_deref())
            .context("failed to load build configuration")?;
        Ok(config.with_density(OutputDensity::from_compress_flag(self.compress)))
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    appforge_watch::init_tracing();

    let config = cli.load_config()?;
    let compiler: Arc<dyn StyleCompiler> = Arc::new(GrassCompiler);
    log_layout(&config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    if cli.watch {
        runtime.block_on(commands::watch::run(&config, compiler))
    } else {
        let code = runtime.block_on(commands::build::run(&config, compiler));
        // Dropping the runtime first lets child-process bookkeeping finish.
        drop(runtime);
        if code != 0 {
            std::process::exit(code);
        }
        Ok(())
    }
}

fn log_layout(config: &BuildConfig) {
    tracing::debug!(
        scripts = %config.script_root.display(),
        styles = %config.style_root.display(),
        assets = %config.asset_root().display(),
        output = %config.output_root.display(),
        "source layout"
    );
}
