//! Resolves the concrete set of files an import will copy.
//!
//! Only the first entry of the file map, and only its first pattern, is
//! expanded: the composed glob is `clone_root + basePath + files[0]`. This
//! single-entry limitation is a deliberate scope reduction carried over
//! from the cdnjs import convention; the remaining entries are still
//! written into `originFileMap` untouched, because they exist for the
//! auto-update process rather than for this import.
//!
//! The canonical filename is the first match, relative to the base path and
//! in leading-slash form. When a sibling file with an inserted `min`
//! segment before the final extension exists on disk, that minified name is
//! recorded instead. The preference is a pure filesystem probe; file
//! contents are never inspected.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::core::ImporterError;
use crate::descriptor::{FileMapEntry, join_relative};

/// The files selected for one import.
#[derive(Debug, Clone)]
pub struct ResolvedFileSet {
    /// Absolute paths of every match (files and directories)
    pub files: Vec<PathBuf>,
    /// Canonical entry-point path relative to the base path, e.g. `"/foo.min.js"`
    pub filename: String,
}

/// Expands the file map against a cloned upstream tree.
///
/// # Errors
///
/// Returns [`ImporterError::NoFilesMatched`] when the composed pattern
/// matches nothing; an import cannot proceed without a canonical filename.
pub fn locate_files(clone_root: &Path, file_map: &[FileMapEntry]) -> Result<ResolvedFileSet> {
    let entry = file_map.first().context("file map has no entries")?;
    let pattern = entry.files.first().context("file map entry has no patterns")?;

    let base = join_relative(clone_root, &entry.base_path);
    let composed = base.join(pattern).display().to_string();

    tracing::debug!("Expanding glob pattern: {composed}");

    // Hidden entries are never distributable; without this, a spanning map
    // over the clone root would sweep up the clone's own `.git` tree.
    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..glob::MatchOptions::new()
    };
    let files: Vec<PathBuf> = glob::glob_with(&composed, options)
        .with_context(|| format!("invalid glob pattern: {composed}"))?
        .collect::<Result<_, _>>()
        .with_context(|| format!("failed to expand glob pattern: {composed}"))?;

    let Some(first) = files.first() else {
        return Err(ImporterError::NoFilesMatched { pattern: composed }.into());
    };

    let relative = first
        .strip_prefix(&base)
        .with_context(|| format!("match outside base path: {}", first.display()))?;
    let mut filename = format!("/{}", relative.display().to_string().replace('\\', "/"));

    if let Some(minified) = minified_variant(&filename) {
        if join_relative(&base, &minified).exists() {
            filename = minified;
        }
    }

    Ok(ResolvedFileSet { files, filename })
}

/// Derives the minified-style sibling name by inserting a `min` segment
/// before the final extension: `/foo.js` becomes `/foo.min.js`.
///
/// Returns `None` for names without an extension, including the case where
/// the only dot belongs to a parent directory.
fn minified_variant(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(format!("{stem}.min.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x").unwrap();
    }

    #[test]
    fn spanning_pattern_matches_everything_under_base() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("dist/foo.js"));
        touch(&tmp.path().join("dist/nested/bar.js"));

        let map = vec![FileMapEntry::spanning("/dist")];
        let resolved = locate_files(tmp.path(), &map).unwrap();
        assert!(resolved.files.iter().any(|f| f.ends_with("dist/foo.js")));
        assert!(resolved.files.iter().any(|f| f.ends_with("dist/nested/bar.js")));
    }

    #[test]
    fn canonical_filename_is_first_match_in_slash_form() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("dist/foo.js"));

        let map = vec![FileMapEntry::spanning("/dist")];
        let resolved = locate_files(tmp.path(), &map).unwrap();
        assert_eq!(resolved.filename, "/foo.js");
    }

    #[test]
    fn minified_sibling_is_preferred() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("dist/foo.js"));
        touch(&tmp.path().join("dist/foo.min.js"));

        let map = vec![FileMapEntry::spanning("/dist")];
        let resolved = locate_files(tmp.path(), &map).unwrap();
        assert_eq!(resolved.filename, "/foo.min.js");
    }

    #[test]
    fn without_minified_sibling_the_plain_name_is_kept() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("dist/foo.js"));
        // A minified file for a different stem must not be picked up
        touch(&tmp.path().join("dist/other.min.js"));

        let map = vec![
            FileMapEntry { base_path: "/dist".to_string(), files: vec!["foo.js".to_string()] },
        ];
        let resolved = locate_files(tmp.path(), &map).unwrap();
        assert_eq!(resolved.filename, "/foo.js");
    }

    #[test]
    fn empty_match_set_is_a_fatal_resolution_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("dist")).unwrap();

        let map = vec![
            FileMapEntry { base_path: "/dist".to_string(), files: vec!["*.css".to_string()] },
        ];
        let err = locate_files(tmp.path(), &map).unwrap_err();
        match err.downcast_ref::<ImporterError>() {
            Some(ImporterError::NoFilesMatched { pattern }) => {
                assert!(pattern.ends_with("*.css"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn only_the_first_pattern_of_the_first_entry_is_resolved() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("dist/foo.js"));
        touch(&tmp.path().join("styles/foo.css"));

        // The second pattern and second entry both match files that exist,
        // but only dist/*.zip is expanded.
        let map = vec![
            FileMapEntry {
                base_path: "/dist".to_string(),
                files: vec!["*.zip".to_string(), "*.js".to_string()],
            },
            FileMapEntry { base_path: "/styles".to_string(), files: vec!["*.css".to_string()] },
        ];
        assert!(matches!(
            locate_files(tmp.path(), &map).unwrap_err().downcast_ref::<ImporterError>(),
            Some(ImporterError::NoFilesMatched { .. })
        ));
    }

    #[test]
    fn hidden_entries_are_excluded_from_spanning_maps() {
        let tmp = TempDir::new().unwrap();
        // A clone root always carries its own .git tree; a spanning map
        // over "/" must not pick it up.
        touch(&tmp.path().join(".git/HEAD"));
        touch(&tmp.path().join(".git/objects/info/packs"));
        touch(&tmp.path().join(".npmignore"));
        touch(&tmp.path().join("lib.js"));
        touch(&tmp.path().join("package.json"));

        let map = vec![FileMapEntry::spanning("/")];
        let resolved = locate_files(tmp.path(), &map).unwrap();
        assert_eq!(resolved.filename, "/lib.js");
        assert!(resolved.files.iter().all(|f| {
            f.strip_prefix(tmp.path())
                .unwrap()
                .components()
                .all(|c| !c.as_os_str().to_string_lossy().starts_with('.'))
        }));
    }

    #[test]
    fn minified_variant_inserts_min_before_the_extension() {
        assert_eq!(minified_variant("/foo.js").as_deref(), Some("/foo.min.js"));
        assert_eq!(minified_variant("/a/b/foo.bar.js").as_deref(), Some("/a/b/foo.bar.min.js"));
        assert_eq!(minified_variant("/LICENSE"), None);
        assert_eq!(minified_variant("/v1.2/LICENSE"), None);
    }
}
