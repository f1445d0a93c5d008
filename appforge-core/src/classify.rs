//! Path classification.
//!
//! [`Classifier::classify`] maps a raw filesystem path to its build domain.
//! Checks are ordered by specificity:
//!
//! 1. script extension under the script root → [`Domain::Script`]
//! 2. style extension under the style root → [`Domain::Style`]
//! 3. anything else under the asset root → [`Domain::Asset`]
//!
//! Paths outside every root are ignored (`None`). Directories are never
//! classified by extension; see [`Classifier::asset_dir_destination`].

use std::path::{Path, PathBuf};

use crate::config::BuildConfig;
use crate::types::{ClassifiedPath, Domain};

/// Pure path → domain mapping built from a [`BuildConfig`].
#[derive(Debug, Clone)]
pub struct Classifier {
    script_root: PathBuf,
    style_root: PathBuf,
    asset_root: PathBuf,
    output_root: PathBuf,
    script_extensions: Vec<String>,
    style_extensions: Vec<String>,
}

impl Classifier {
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            script_root: config.script_root.clone(),
            style_root: config.style_root.clone(),
            asset_root: config.asset_root().to_path_buf(),
            output_root: config.output_root.clone(),
            script_extensions: normalize_extensions(&config.script_extensions),
            style_extensions: normalize_extensions(&config.style_extensions),
        }
    }

    /// Classify a file path. Returns `None` for paths outside every root.
    ///
    /// A style extension only makes a file Style under the style root. With
    /// sibling roots, a stray `.scss` under the asset root is an ordinary asset
    /// and gets mirrored, so each path lands in exactly one domain and the
    /// mirror never silently drops a file the stylesheet does not include.
    pub fn classify(&self, path: &Path) -> Option<ClassifiedPath> {
        if self.is_script_extension(path) {
            if let Ok(relative) = path.strip_prefix(&self.script_root) {
                return Some(classified(path, Domain::Script, relative));
            }
        }
        if self.is_style_extension(path) {
            if let Ok(relative) = path.strip_prefix(&self.style_root) {
                return Some(classified(path, Domain::Style, relative));
            }
        }
        path.strip_prefix(&self.asset_root)
            .ok()
            .map(|relative| classified(path, Domain::Asset, relative))
    }

    /// Mirrored destination of an asset file, `None` for any other domain.
    pub fn asset_destination(&self, path: &Path) -> Option<PathBuf> {
        self.classify(path)
            .filter(|c| c.domain == Domain::Asset)
            .map(|c| c.destination(&self.output_root))
    }

    /// Mirrored destination of a directory under the asset root.
    pub fn asset_dir_destination(&self, dir: &Path) -> Option<PathBuf> {
        dir.strip_prefix(&self.asset_root)
            .ok()
            .map(|relative| self.output_root.join(relative))
    }

    pub fn is_script_extension(&self, path: &Path) -> bool {
        has_extension(path, &self.script_extensions)
    }

    pub fn is_style_extension(&self, path: &Path) -> bool {
        has_extension(path, &self.style_extensions)
    }

    pub fn style_root(&self) -> &Path {
        &self.style_root
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }
}

fn classified(path: &Path, domain: Domain, relative: &Path) -> ClassifiedPath {
    ClassifiedPath {
        path: path.to_path_buf(),
        domain,
        relative: relative.to_path_buf(),
    }
}

/// Lowercase, leading dot stripped: `".TSX"` and `"tsx"` are the same extension.
fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
