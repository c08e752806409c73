//! File system utilities for packaging.
//!
//! Idempotent directory creation and recursive copies with error context.

use crate::release::error::{Error, ErrorExt, Result};
use std::{
    fs, io,
    path::Path,
};

/// Creates all of the directories of the specified path, erasing it first if specified.
pub fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path)?;
    }
    fs::create_dir_all(path).fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Copies a regular file, creating any parent directories of the destination.
///
/// Fails if the source path is a directory or doesn't exist.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(Error::tool(format!("{from:?} does not exist")));
    }
    if !from.is_file() {
        return Err(Error::tool(format!("{from:?} is not a file")));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir).fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).fs_context("copying file", from)?;
    Ok(())
}

/// Recursively copies the contents of `from` into `to`.
///
/// Existing files in `to` are overwritten, other entries are kept.
pub fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        return Err(Error::tool(format!("{from:?} is not a directory")));
    }
    fs::create_dir_all(to).fs_context("creating directory", to)?;

    for entry in walkdir::WalkDir::new(from).sort_by_file_name() {
        let entry = entry?;
        let rel_path = entry.path().strip_prefix(from)?;
        let dest_path = to.join(rel_path);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
        } else {
            fs::copy(entry.path(), &dest_path).fs_context("copying file", entry.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_nested_trees() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("a/b")).unwrap();
        fs::write(src.path().join("a/b/file.txt"), "x").unwrap();
        fs::write(src.path().join("top.txt"), "y").unwrap();

        let dst = tempfile::tempdir().unwrap();
        let target = dst.path().join("copy");
        copy_dir(src.path(), &target).unwrap();

        assert_eq!(fs::read_to_string(target.join("a/b/file.txt")).unwrap(), "x");
        assert_eq!(fs::read_to_string(target.join("top.txt")).unwrap(), "y");
    }

    #[test]
    fn erase_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("stale"), "").unwrap();

        create_dir_all(&path, true).unwrap();
        assert!(path.is_dir());
        assert!(!path.join("stale").exists());
        remove_dir_all(&dir.path().join("never-created")).unwrap();
    }

    #[test]
    fn copy_file_rejects_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_file(&dir.path().join("nope"), &dir.path().join("to")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
