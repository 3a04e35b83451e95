//! Materializes the destination layout inside the target repository.
//!
//! Every library lives at `<libs_root>/<name>` with one subdirectory per
//! imported version. The package metadata is per-library, shared across
//! versions, and overwritten on every import of any version; the files of a
//! version land flattened (base filename only) inside the version
//! directory.
//!
//! There is no transactional rollback: a copy failure aborts the import but
//! leaves the directories and metadata written so far in place.

use anyhow::{Context, Result};
use futures::future::try_join_all;
use std::path::{Path, PathBuf};

use crate::constants::PACKAGE_JSON;
use crate::descriptor::Descriptor;
use crate::utils::fs::{copy_path, ensure_dir};

/// Derived destination paths for one library version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationLayout {
    /// `<libs_root>/<name>` - holds the shared package metadata
    pub library_path: PathBuf,
    /// `<libs_root>/<name>/<version>` - holds this version's files
    pub version_path: PathBuf,
}

impl DestinationLayout {
    /// Derives the layout for a library name and version.
    #[must_use]
    pub fn new(libs_root: &Path, name: &str, version: &str) -> Self {
        let library_path = libs_root.join(name);
        let version_path = library_path.join(version);
        Self { library_path, version_path }
    }

    /// Creates the version directory and any missing ancestors.
    ///
    /// Idempotent: a pre-existing version directory is not an error, though
    /// its contents may be overwritten by the subsequent copy step.
    pub fn create(&self) -> Result<()> {
        ensure_dir(&self.version_path)
    }

    /// Writes the normalized descriptor as the library's `package.json`.
    pub fn write_descriptor(&self, descriptor: &Descriptor) -> Result<()> {
        descriptor.write(&self.library_path.join(PACKAGE_JSON))
    }

    /// Copies every resolved path into the version directory, flattened to
    /// its base filename.
    ///
    /// Copies run concurrently; the step succeeds only if every individual
    /// copy succeeds.
    pub async fn copy_files(&self, files: &[PathBuf]) -> Result<()> {
        let copies = files.iter().map(|src| {
            let dest = src
                .file_name()
                .map(|base| self.version_path.join(base))
                .with_context(|| format!("path has no file name: {}", src.display()));
            async move { copy_path(src, &dest?).await }
        });
        try_join_all(copies).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn layout(root: &Path) -> DestinationLayout {
        DestinationLayout::new(root, "foo", "1.2.3")
    }

    #[test]
    fn layout_derives_library_and_version_paths() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(tmp.path());
        assert_eq!(layout.library_path, tmp.path().join("foo"));
        assert_eq!(layout.version_path, tmp.path().join("foo/1.2.3"));
    }

    #[test]
    fn create_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(tmp.path());
        layout.create().unwrap();
        layout.create().unwrap();
        assert!(layout.version_path.is_dir());
    }

    #[test]
    fn descriptor_is_written_at_the_library_level() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(tmp.path());
        layout.create().unwrap();

        let descriptor = Descriptor::from_fields(
            json!({"name": "foo", "version": "1.2.3"}).as_object().unwrap().clone(),
        );
        layout.write_descriptor(&descriptor).unwrap();

        assert!(layout.library_path.join("package.json").exists());
        assert!(!layout.version_path.join("package.json").exists());
    }

    #[tokio::test]
    async fn copies_are_flattened_to_base_filenames() {
        let tmp = TempDir::new().unwrap();
        let src_root = tmp.path().join("clone/dist");
        std::fs::create_dir_all(src_root.join("nested")).unwrap();
        std::fs::write(src_root.join("foo.js"), "a").unwrap();
        std::fs::write(src_root.join("nested/bar.js"), "b").unwrap();

        let layout = layout(&tmp.path().join("libs"));
        layout.create().unwrap();
        layout
            .copy_files(&[src_root.join("foo.js"), src_root.join("nested/bar.js")])
            .await
            .unwrap();

        assert!(layout.version_path.join("foo.js").exists());
        assert!(layout.version_path.join("bar.js").exists());
        assert!(!layout.version_path.join("nested").exists());
    }

    #[tokio::test]
    async fn a_missing_source_fails_the_whole_copy_step() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("present.js");
        std::fs::write(&src, "x").unwrap();

        let layout = layout(&tmp.path().join("libs"));
        layout.create().unwrap();
        let result = layout.copy_files(&[src, tmp.path().join("absent.js")]).await;
        assert!(result.is_err());
    }
}
