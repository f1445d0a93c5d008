//! Deterministic recursive file listing.
//!
//! Entries of each directory are visited in file-name order and
//! sub-directories are descended into where they sort, so the listing order
//! ("discovery order") is stable across runs and platforms.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// List every file under `root`, depth-first, in discovery order.
///
/// Fails with `NotFound` when `root` itself does not exist. Entries that
/// vanish mid-walk are skipped.
pub fn list_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk_into(root, &mut files, true)?;
    Ok(files)
}

fn walk_into(dir: &Path, files: &mut Vec<PathBuf>, is_root: bool) -> io::Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if !is_root && err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };

    let mut entries = entries.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let ty = match entry.file_type() {
            Ok(ty) => ty,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        };
        if ty.is_dir() {
            walk_into(&path, files, false)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_nested_files_in_name_order() {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("b/inner")).expect("mkdir");
        fs::write(root.join("c.txt"), "").expect("write");
        fs::write(root.join("a.txt"), "").expect("write");
        fs::write(root.join("b/inner/z.txt"), "").expect("write");
        fs::write(root.join("b/y.txt"), "").expect("write");

        let files = list_files(root).expect("list");
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).expect("prefix").to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b/inner/z.txt"),
                PathBuf::from("b/y.txt"),
                PathBuf::from("c.txt"),
            ]
        );
    }

    #[test]
    fn missing_root_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let err = list_files(&dir.path().join("absent")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn empty_dirs_contribute_nothing() {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join("empty/deeper")).expect("mkdir");
        assert!(list_files(dir.path()).expect("list").is_empty());
    }
}
