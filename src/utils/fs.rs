//! File system helpers used by the repository writer.
//!
//! Directory creation is idempotent: creating a path that already exists is
//! not an error, matching the semantics the destination layout relies on
//! when a version is re-imported. Copies handle both files and directories
//! since a `**/*` glob can match either.

use anyhow::{Context, Result};
use std::path::Path;
use walkdir::WalkDir;

use crate::core::ImporterError;

/// Ensures a directory exists, creating it and all missing ancestors.
///
/// Succeeds silently if the directory is already present. Fails if the path
/// exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| {
            anyhow::Error::from(ImporterError::FileSystemError {
                operation: "create directory".to_string(),
                path: path.display().to_string(),
            })
            .context(e)
        })?;
    } else if !path.is_dir() {
        anyhow::bail!("path exists but is not a directory: {}", path.display());
    }
    Ok(())
}

/// Copies a file or directory tree from `src` to `dest`.
///
/// Files are copied directly; directories are walked recursively with their
/// internal structure preserved below `dest`. Directory copies run on the
/// blocking thread pool so concurrent copies do not starve the runtime.
pub async fn copy_path(src: &Path, dest: &Path) -> Result<()> {
    if src.is_dir() {
        let src = src.to_path_buf();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || copy_dir_recursive(&src, &dest))
            .await
            .context("copy task panicked")?
    } else {
        tokio::fs::copy(src, dest).await.map_err(|e| {
            anyhow::Error::from(ImporterError::FileSystemError {
                operation: "copy".to_string(),
                path: src.display().to_string(),
            })
            .context(e)
        })?;
        Ok(())
    }
}

/// Recursively copies a directory tree, creating destination directories as
/// needed.
fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("failed to walk {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("path outside copy root: {}", entry.path().display()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                ensure_dir(parent)?;
            }
            std::fs::copy(entry.path(), &target).map_err(|e| {
                anyhow::Error::from(ImporterError::FileSystemError {
                    operation: "copy".to_string(),
                    path: entry.path().display().to_string(),
                })
                .context(e)
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn ensure_dir_creates_nested_path() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("libs/foo/1.2.3");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn ensure_dir_rejects_files() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("occupied");
        std::fs::write(&file, "x").unwrap();
        assert!(ensure_dir(&file).is_err());
    }

    #[tokio::test]
    async fn copy_path_copies_a_file() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("foo.js");
        std::fs::write(&src, "console.log(1);").unwrap();
        let dest = tmp.path().join("out.js");
        copy_path(&src, &dest).await.unwrap();
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "console.log(1);");
    }

    #[tokio::test]
    async fn copy_path_copies_a_directory_tree() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("dist");
        ensure_dir(&src.join("nested")).unwrap();
        std::fs::write(src.join("foo.js"), "a").unwrap();
        std::fs::write(src.join("nested/bar.js"), "b").unwrap();

        let dest = tmp.path().join("copy");
        copy_path(&src, &dest).await.unwrap();
        assert_eq!(std::fs::read_to_string(dest.join("foo.js")).unwrap(), "a");
        assert_eq!(std::fs::read_to_string(dest.join("nested/bar.js")).unwrap(), "b");
    }
}
