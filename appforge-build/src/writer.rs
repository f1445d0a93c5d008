//! Replacing writer for generated output files.
//!
//! ## `atomic_write` protocol
//!
//! 1. Ensure the parent directory exists.
//! 2. Write the full content to `<path>.appforge.tmp`.
//! 3. Rename onto the final path (atomic on POSIX).
//!
//! Readers of `path` observe either the previous content or the new content,
//! never a truncated file.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{io_err, BuildError};

/// Replace `path` with `content` in a single visible step.
pub async fn atomic_write(path: &Path, content: &str) -> Result<(), BuildError> {
    let tmp = PathBuf::from(format!("{}.appforge.tmp", path.display()));
    atomic_write_with_tmp(path, content, &tmp).await
}

async fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| io_err(parent, e))?;
    }

    fs::write(tmp, content).await.map_err(|e| io_err(tmp, e))?;

    if let Err(e) = fs::rename(tmp, path).await {
        let _ = fs::remove_file(tmp).await;
        return Err(io_err(path, e));
    }

    tracing::debug!("wrote: {}", path.display());
    Ok(())
}
