//! Asset mirror: keeps the output tree a copy of every asset-domain source.
//!
//! | Operation      | Effect on output tree                          |
//! |----------------|------------------------------------------------|
//! | `mirror_all`   | copy every asset file, creating directories    |
//! | `mirror_one`   | copy one file (overwrites)                     |
//! | `remove_one`   | delete one mirrored file                       |
//! | `mirror_dir`   | create a directory, copy assets already in it  |
//! | `remove_dir`   | delete a mirrored directory recursively        |
//!
//! Removing something that is already gone is not an error: watch mode sees
//! delete/recreate races routinely.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::time::Instant;

use appforge_core::{walk, BuildConfig, BuildOutcome, Classifier, Domain, Pipeline};

use crate::error::{io_err, task_err, BuildError};

/// Outcome of an individual mirror action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorResult {
    /// File copied to its destination.
    Copied { from: PathBuf, to: PathBuf },
    /// Destination directory created (or already present).
    CreatedDir { path: PathBuf },
    /// Destination file or directory removed.
    Removed { path: PathBuf },
    /// Nothing to remove; the destination was already absent.
    Absent { path: PathBuf },
    /// The source is not an asset; nothing mirrored.
    Skipped { path: PathBuf },
}

/// Mirrors asset-domain files from the asset root into the output root.
#[derive(Debug, Clone)]
pub struct AssetMirror {
    classifier: Classifier,
}

impl AssetMirror {
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            classifier: Classifier::new(config),
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Copy every asset file under the asset root. A missing asset root fails.
    pub async fn mirror_all(&self) -> Result<Vec<MirrorResult>, BuildError> {
        let files = list_files(self.classifier.asset_root()).await?;
        let mut results = Vec::new();
        for file in files {
            if let Some(classified) = self.classifier.classify(&file) {
                if classified.domain == Domain::Asset {
                    let to = classified.destination(self.classifier.output_root());
                    results.push(copy_file(&file, &to).await?);
                }
            }
        }
        Ok(results)
    }

    /// Copy one asset file to its mirrored destination.
    pub async fn mirror_one(&self, path: &Path) -> Result<MirrorResult, BuildError> {
        match self.classifier.asset_destination(path) {
            Some(to) => copy_file(path, &to).await,
            None => Ok(MirrorResult::Skipped {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Delete the mirrored copy of one asset file.
    pub async fn remove_one(&self, path: &Path) -> Result<MirrorResult, BuildError> {
        let Some(dest) = self.classifier.asset_destination(path) else {
            return Ok(MirrorResult::Skipped {
                path: path.to_path_buf(),
            });
        };
        match fs::remove_file(&dest).await {
            Ok(()) => Ok(MirrorResult::Removed { path: dest }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(MirrorResult::Absent { path: dest }),
            Err(err) => Err(io_err(&dest, err)),
        }
    }

    /// Create the mirrored directory, then copy any asset files the source
    /// directory already holds (a directory moved into the tree arrives as a
    /// single event).
    pub async fn mirror_dir(&self, dir: &Path) -> Result<Vec<MirrorResult>, BuildError> {
        let Some(dest) = self.classifier.asset_dir_destination(dir) else {
            return Ok(vec![MirrorResult::Skipped {
                path: dir.to_path_buf(),
            }]);
        };
        fs::create_dir_all(&dest)
            .await
            .map_err(|e| io_err(&dest, e))?;
        let mut results = vec![MirrorResult::CreatedDir { path: dest }];

        let files = match list_files(dir).await {
            Ok(files) => files,
            // The directory vanished again before we could look inside.
            Err(BuildError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                return Ok(results)
            }
            Err(err) => return Err(err),
        };
        for file in files {
            let result = self.mirror_one(&file).await?;
            if !matches!(result, MirrorResult::Skipped { .. }) {
                results.push(result);
            }
        }
        Ok(results)
    }

    /// Recursively delete the mirrored directory.
    pub async fn remove_dir(&self, dir: &Path) -> Result<MirrorResult, BuildError> {
        let Some(dest) = self.classifier.asset_dir_destination(dir) else {
            return Ok(MirrorResult::Skipped {
                path: dir.to_path_buf(),
            });
        };
        match fs::remove_dir_all(&dest).await {
            Ok(()) => Ok(MirrorResult::Removed { path: dest }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(MirrorResult::Absent { path: dest }),
            Err(err) => Err(io_err(&dest, err)),
        }
    }
}

/// Asset pipeline entrypoint used by the batch runner.
pub async fn copy_assets(config: &BuildConfig) -> BuildOutcome {
    tracing::info!("> Copying assets...");
    let started = Instant::now();

    let results = AssetMirror::new(config)
        .mirror_all()
        .await
        .map_err(|e| e.into_failure(Pipeline::Asset))?;

    tracing::info!(
        "> {} assets copied in {:.3}s!",
        results.len(),
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

async fn copy_file(from: &Path, to: &Path) -> Result<MirrorResult, BuildError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| io_err(parent, e))?;
    }
    fs::copy(from, to).await.map_err(|e| io_err(from, e))?;
    Ok(MirrorResult::Copied {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
    })
}

async fn list_files(root: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let owned = root.to_path_buf();
    tokio::task::spawn_blocking(move || walk::list_files(&owned))
        .await
        .map_err(|e| task_err(root, e))?
        .map_err(|e| io_err(root, e))
}
