//! Upstream package descriptor handling.
//!
//! An upstream repository must ship a `package.json` at its root; that file
//! is the machine-readable source of the library name, version, and any
//! other metadata carried into the target repository. This module loads the
//! descriptor, resolves which directory holds the distributable files, and
//! applies the normalization policy before the descriptor is written back
//! into the target:
//!
//! - build-only fields (`scripts`, `devDependencies`) are stripped, since
//!   they are meaningless in the consumption context
//! - `originName` and `originFileMap` are added so the cdnjs auto-update
//!   process knows where to re-fetch files for future versions
//! - if the upstream already declares its own `autoupdate` configuration,
//!   the two added fields are removed again instead, so a library never
//!   carries two competing auto-update mechanisms

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_FILE_PATTERN, SOURCE_DIR_CANDIDATES};
use crate::core::ImporterError;

/// One entry of an auto-update file map: a base directory inside the
/// upstream repository plus glob patterns selecting files beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMapEntry {
    /// Directory inside the upstream tree, in leading-slash form (`"/dist"`)
    #[serde(rename = "basePath")]
    pub base_path: String,
    /// Glob patterns relative to `base_path`
    pub files: Vec<String>,
}

impl FileMapEntry {
    /// An entry spanning everything under `base_path`.
    #[must_use]
    pub fn spanning(base_path: impl Into<String>) -> Self {
        Self { base_path: base_path.into(), files: vec![DEFAULT_FILE_PATTERN.to_string()] }
    }
}

/// The source directory chosen for an import: its absolute location inside
/// the clone and its leading-slash form recorded in the file map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDir {
    /// Absolute path inside the cloned upstream tree
    pub path: PathBuf,
    /// The directory relative to the clone root, e.g. `"/dist"` or `"/"`
    pub relative: String,
}

/// Resolves which directory of the cloned upstream tree holds the
/// distributable files.
///
/// With an explicit override the override wins unconditionally. Otherwise
/// the fixed candidate list (`/dist`, `/build`, `/src`, `/`) is probed in
/// order and the first directory that exists is selected; the `/` entry
/// always exists, so resolution cannot fail to produce a directory.
pub fn resolve_source_dir(clone_root: &Path, dir_override: Option<&str>) -> SourceDir {
    if let Some(dir) = dir_override {
        let relative =
            if dir.starts_with('/') { dir.to_string() } else { format!("/{dir}") };
        let path = join_relative(clone_root, &relative);
        return SourceDir { path, relative };
    }

    for candidate in SOURCE_DIR_CANDIDATES {
        let path = join_relative(clone_root, candidate);
        if path.exists() {
            return SourceDir { path, relative: candidate.to_string() };
        }
    }

    // Unreachable in practice: "/" is in the candidate list and the clone
    // root exists, but fall back to it explicitly anyway.
    SourceDir { path: clone_root.to_path_buf(), relative: "/".to_string() }
}

/// Joins a leading-slash relative directory onto a root path.
pub fn join_relative(root: &Path, relative: &str) -> PathBuf {
    let trimmed = relative.trim_start_matches('/');
    if trimmed.is_empty() { root.to_path_buf() } else { root.join(trimmed) }
}

/// The upstream `package.json`, kept as a raw JSON object so arbitrary
/// upstream fields survive the round trip into the target repository.
#[derive(Debug, Clone)]
pub struct Descriptor {
    fields: Map<String, Value>,
}

impl Descriptor {
    /// Loads the descriptor from a `package.json` path.
    ///
    /// # Errors
    ///
    /// - [`ImporterError::DescriptorMissing`] if the file does not exist
    /// - [`ImporterError::DescriptorParseError`] if it cannot be read,
    ///   is not valid JSON, or is not a JSON object
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ImporterError::DescriptorMissing {
                path: path.display().to_string(),
            }
            .into());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| ImporterError::DescriptorParseError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let value: Value =
            serde_json::from_str(&contents).map_err(|e| ImporterError::DescriptorParseError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ImporterError::DescriptorParseError {
                path: path.display().to_string(),
                reason: format!("expected a JSON object, found {}", json_type_name(&other)),
            }
            .into()),
        }
    }

    /// Builds a descriptor from an existing JSON object (used by tests and
    /// by stages that construct state directly).
    #[must_use]
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// The library name.
    pub fn name(&self) -> Result<&str> {
        self.required_str("name")
    }

    /// The library version.
    pub fn version(&self) -> Result<&str> {
        self.required_str("version")
    }

    fn required_str(&self, field: &str) -> Result<&str> {
        match self.fields.get(field).and_then(Value::as_str) {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(ImporterError::DescriptorInvalid {
                reason: format!("missing or empty '{field}' field"),
            }
            .into()),
        }
    }

    /// Removes build-only fields that are meaningless in the consumption
    /// context.
    pub fn strip_build_fields(&mut self) {
        self.fields.remove("scripts");
        self.fields.remove("devDependencies");
    }

    /// Attaches the auto-update fields: the upstream's own name and the
    /// file map describing where future versions' files live.
    pub fn set_origin(&mut self, file_map: &[FileMapEntry]) -> Result<()> {
        let name = self.name()?.to_string();
        self.fields.insert("originName".to_string(), Value::String(name));
        self.fields.insert("originFileMap".to_string(), serde_json::to_value(file_map)?);
        Ok(())
    }

    /// Records the canonical filename of the library's entry point.
    pub fn set_filename(&mut self, filename: &str) {
        self.fields.insert("filename".to_string(), Value::String(filename.to_string()));
    }

    /// Whether the upstream declares its own auto-update configuration.
    #[must_use]
    pub fn has_autoupdate(&self) -> bool {
        self.fields.contains_key("autoupdate")
    }

    /// Drops the added auto-update fields when the upstream self-describes.
    ///
    /// Returns `true` when the descriptor carried an `autoupdate` field and
    /// `originName`/`originFileMap` were removed.
    pub fn reconcile_autoupdate(&mut self) -> bool {
        if self.has_autoupdate() {
            self.fields.remove("originName");
            self.fields.remove("originFileMap");
            true
        } else {
            false
        }
    }

    /// Looks up an arbitrary field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Writes the descriptor pretty-printed to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut contents = serde_json::to_string_pretty(&self.fields)?;
        contents.push('\n');
        std::fs::write(path, contents).map_err(|e| {
            anyhow::Error::from(ImporterError::FileSystemError {
                operation: "write package.json".to_string(),
                path: path.display().to_string(),
            })
            .context(e)
        })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
