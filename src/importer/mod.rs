//! The import pipeline controller.
//!
//! [`CdnImporter`] orchestrates the strictly ordered sequence of stages
//! that turns an upstream git repository into a versioned library inside
//! the target cdnjs repository:
//!
//! 1. pull the target repository from its upstream remote
//! 2. provision a temporary directory and clone the upstream into it
//! 3. load the upstream `package.json` and resolve the source directory
//! 4. derive the destination layout and attach auto-update metadata
//! 5. expand the file map and derive the canonical filename
//! 6. normalize the descriptor (build fields, autoupdate reconciliation)
//! 7. create the version directory, write metadata, copy files
//! 8. checkout master, create the import branch, stage, commit
//!
//! Every stage gates on the previous one; the first error aborts the
//! remaining sequence. Neither the temporary clone nor partially written
//! destination content is cleaned up on failure - the clone is left on
//! disk for inspection, and destination writes are not transactional.
//!
//! Batches run all imports concurrently, each with its own temporary
//! clone. The only shared state is the target repository itself, so
//! concurrent imports of the same library and version are unsafe and must
//! be serialized by the caller.

use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::{Path, PathBuf};

use crate::constants::{BRANCH_PREFIX, DEFAULT_REMOTE, LIBS_SUBPATH, PACKAGE_JSON};
use crate::core::ImporterError;
use crate::descriptor::{Descriptor, FileMapEntry, resolve_source_dir};
use crate::git::{GitRepo, ensure_git_available};
use crate::locator::locate_files;
use crate::writer::DestinationLayout;

/// One library to import.
///
/// A bare git URL is the minimal form; the directory override and file map
/// are optional refinements for upstreams whose layout the default
/// heuristics get wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// The upstream git URL (anything `git clone` accepts)
    pub git_url: String,
    /// Explicit source directory inside the upstream tree, e.g. `"/dist"`
    pub dir: Option<String>,
    /// Explicit auto-update file map; defaults to one entry spanning the
    /// resolved source directory
    pub file_map: Option<Vec<FileMapEntry>>,
}

impl ImportRequest {
    /// Creates a request for a bare git URL.
    pub fn new(git_url: impl Into<String>) -> Self {
        Self { git_url: git_url.into(), dir: None, file_map: None }
    }

    /// Sets the source directory override.
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<String>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Sets the explicit file map.
    #[must_use]
    pub fn with_file_map(mut self, file_map: Vec<FileMapEntry>) -> Self {
        self.file_map = Some(file_map);
        self
    }
}

impl From<&str> for ImportRequest {
    fn from(git_url: &str) -> Self {
        Self::new(git_url)
    }
}

/// Construction options for [`CdnImporter`].
///
/// Logging is the caller's concern: the library emits `tracing` events and
/// never installs a subscriber itself.
#[derive(Debug, Clone)]
pub struct ImporterOptions {
    /// Absolute path to the local cdnjs repository
    pub cdnjs_root: PathBuf,
    /// Remote the target repository is pulled from before each import
    pub remote: String,
}

impl ImporterOptions {
    /// Options for a target repository with the default remote.
    pub fn new(cdnjs_root: impl Into<PathBuf>) -> Self {
        Self { cdnjs_root: cdnjs_root.into(), remote: DEFAULT_REMOTE.to_string() }
    }

    /// Overrides the remote the target repository is pulled from.
    #[must_use]
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }
}

/// What a successful import produced.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// Library name from the upstream descriptor
    pub name: String,
    /// Library version from the upstream descriptor
    pub version: String,
    /// Branch the import was committed on
    pub branch: String,
    /// Directory the version's files were copied into
    pub version_path: PathBuf,
}

/// The result of one request within a batch.
#[derive(Debug)]
pub struct ImportResult {
    /// The request that was run
    pub request: ImportRequest,
    /// Its outcome
    pub outcome: Result<ImportOutcome>,
}

/// Aggregate result of a batch of imports.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Per-request results, in request order
    pub results: Vec<ImportResult>,
}

impl BatchReport {
    /// Successful outcomes.
    pub fn succeeded(&self) -> impl Iterator<Item = &ImportOutcome> {
        self.results.iter().filter_map(|r| r.outcome.as_ref().ok())
    }

    /// Failed requests with their errors.
    pub fn failed(&self) -> impl Iterator<Item = (&ImportRequest, &anyhow::Error)> {
        self.results.iter().filter_map(|r| match &r.outcome {
            Ok(_) => None,
            Err(e) => Some((&r.request, e)),
        })
    }

    /// Whether every import succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_ok())
    }

    /// The first error encountered, in request order.
    #[must_use]
    pub fn first_error(&self) -> Option<&anyhow::Error> {
        self.failed().next().map(|(_, e)| e)
    }
}

/// Imports libraries into a local cdnjs repository.
#[derive(Debug)]
pub struct CdnImporter {
    libs_root: PathBuf,
    remote: String,
    git: GitRepo,
}

impl CdnImporter {
    /// Validates the environment and target repository structure.
    ///
    /// Fails before any network or filesystem mutation when git is not
    /// installed or `<cdnjs_root>/ajax/libs` does not exist.
    pub fn new(options: &ImporterOptions) -> Result<Self> {
        ensure_git_available()?;

        let libs_root = options.cdnjs_root.join(LIBS_SUBPATH);
        if !libs_root.is_dir() {
            return Err(ImporterError::LibraryRootMissing {
                path: libs_root.display().to_string(),
            }
            .into());
        }

        Ok(Self {
            git: GitRepo::new(&options.cdnjs_root),
            libs_root,
            remote: options.remote.clone(),
        })
    }

    /// The `ajax/libs` directory imports are written into.
    #[must_use]
    pub fn libs_root(&self) -> &Path {
        &self.libs_root
    }

    /// Runs the full import pipeline for one library.
    ///
    /// See the module docs for the stage order. The first failing stage
    /// aborts the import; earlier writes are not rolled back.
    pub async fn import(&self, request: &ImportRequest) -> Result<ImportOutcome> {
        tracing::info!("Pulling from origin");
        self.git
            .pull(&self.remote)
            .await
            .with_context(|| format!("failed to pull the target repository from {}", self.remote))?;

        // The clone is deliberately not cleaned up on failure; it stays on
        // disk for inspection.
        let clone_path = tempfile::tempdir()
            .context("failed to create a temporary directory for the upstream clone")?
            .keep();

        tracing::info!("Cloning {} into {}", request.git_url, clone_path.display());
        GitRepo::clone(&request.git_url, &clone_path).await?;

        let mut descriptor = Descriptor::load(&clone_path.join(PACKAGE_JSON))?;
        let source_dir = resolve_source_dir(&clone_path, request.dir.as_deref());
        tracing::info!("Set the source path: {}", source_dir.relative);

        let name = descriptor.name()?.to_string();
        let version = descriptor.version()?.to_string();
        let layout = DestinationLayout::new(&self.libs_root, &name, &version);

        let file_map = request
            .file_map
            .clone()
            .unwrap_or_else(|| vec![FileMapEntry::spanning(source_dir.relative.clone())]);
        descriptor.set_origin(&file_map)?;

        tracing::info!("Creating the version directory: {}", layout.version_path.display());
        layout.create()?;

        tracing::info!("Getting the library files");
        let resolved = locate_files(&clone_path, &file_map)?;
        descriptor.strip_build_fields();
        descriptor.set_filename(&resolved.filename);

        if descriptor.reconcile_autoupdate() {
            tracing::warn!(
                "Found autoupdate in package.json; removing originName and originFileMap"
            );
        }

        tracing::info!("Writing the package.json file in {}", layout.library_path.display());
        layout.write_descriptor(&descriptor)?;

        tracing::info!("Copying the library files");
        layout.copy_files(&resolved.files).await.context("failed to copy the library files")?;

        tracing::info!("Checking out the master branch");
        self.git.checkout("master").await?;

        let branch = branch_name(&name, &version);
        tracing::info!("Creating a new branch for the library: {branch}");
        self.git.checkout_new_branch(&branch).await?;

        tracing::info!("Adding the new library files in the git repository");
        self.git.stage_all().await?;

        let message = commit_message(&name, &version);
        self.git.commit(&message).await?;
        tracing::info!("{message}");

        Ok(ImportOutcome { name, version, branch, version_path: layout.version_path })
    }

    /// Runs a batch of imports concurrently and joins on all of them.
    ///
    /// Each import operates on its own temporary clone; a failure in one
    /// never aborts the others. Requests targeting the same library and
    /// version must be serialized by the caller.
    pub async fn import_all(&self, requests: &[ImportRequest]) -> BatchReport {
        let results = join_all(requests.iter().map(|request| async move {
            ImportResult { request: request.clone(), outcome: self.import(request).await }
        }))
        .await;
        BatchReport { results }
    }
}

/// Deterministic branch name for a (name, version) pair.
#[must_use]
pub fn branch_name(name: &str, version: &str) -> String {
    format!("{BRANCH_PREFIX}{name}-{version}")
}

/// Deterministic commit message for a (name, version) pair.
#[must_use]
pub fn commit_message(name: &str, version: &str) -> String {
    format!("Added {name}@{version}")
}
