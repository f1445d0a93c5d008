//! JavaScript minify post-step for compact one-shot builds.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tokio::time::Instant;

use appforge_core::{walk, MinifierConfig};

use crate::error::{io_err, task_err, BuildError};

/// Minify every `.js` file under `output_root` in place, running the
/// minifier from `project_dir`.
///
/// Files are processed one at a time; the first failing invocation stops the
/// step. The minifier's own output is passed straight through.
pub async fn minify_output(
    project_dir: &Path,
    output_root: &Path,
    minifier: &MinifierConfig,
) -> Result<(), BuildError> {
    tracing::info!("> Compressing JavaScript...");
    let started = Instant::now();

    let root = output_root.to_path_buf();
    let files = tokio::task::spawn_blocking(move || walk::list_files(&root))
        .await
        .map_err(|e| task_err(output_root, e))?
        .map_err(|e| io_err(output_root, e))?;

    for file in files.iter().filter(|f| is_javascript(f)) {
        minify_file(project_dir, file, minifier).await?;
    }

    tracing::info!(
        "> JavaScript compressed in {:.3}s!",
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

fn is_javascript(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("js")
}

fn minify_args(file: &Path, minifier: &MinifierConfig) -> Vec<PathBuf> {
    let mut args = vec![file.to_path_buf()];
    args.extend(minifier.args.iter().map(PathBuf::from));
    args.push(PathBuf::from("-o"));
    args.push(file.to_path_buf());
    args
}

async fn minify_file(
    project_dir: &Path,
    file: &Path,
    minifier: &MinifierConfig,
) -> Result<(), BuildError> {
    let mut command = if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(&minifier.program);
        command
    } else {
        Command::new(&minifier.program)
    };
    let status = command
        .args(minify_args(file, minifier))
        .current_dir(project_dir)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|source| BuildError::Spawn {
            program: minifier.program.clone(),
            source,
        })?;

    if status.success() {
        tracing::debug!("minified: {}", file.display());
        Ok(())
    } else {
        Err(BuildError::Exit {
            program: minifier.program.clone(),
            code: status.code(),
        })
    }
}
