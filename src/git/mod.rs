//! Git operations wrapper for the importer.
//!
//! This module provides a safe, async wrapper around the system `git`
//! command. Like Cargo with `git-fetch-with-cli`, the importer uses the
//! installed git binary rather than an embedded implementation so that
//! SSH agents, credential helpers, and user configuration all work exactly
//! as they do on the command line.
//!
//! The pipeline needs a small set of operations: pulling the target
//! repository, cloning an upstream into a temporary directory, checking
//! out branches (including branch creation), staging, and committing.
//! Everything is built on [`GitCommand`], which handles argument
//! construction, timeouts, logging, and error mapping in one place.

pub mod command_builder;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::ImporterError;
use crate::git::command_builder::GitCommand;

/// A handle to a local git repository.
///
/// Holds only the repository path and queries git directly for everything
/// else, so external git operations never desynchronize the handle.
/// Concurrent operations on the *same* repository can still conflict at the
/// git level (e.g., simultaneous checkouts); the importer serializes all
/// target-repository operations within a single import for this reason.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Creates a handle for an existing local repository.
    ///
    /// Does not verify the path contains a valid repository; use
    /// [`is_git_repo`](Self::is_git_repo) for that.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Clones a repository from `url` into `target` and returns a handle.
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::GitCloneFailed`] when the URL is
    /// unreachable, authentication fails, or the target is unusable.
    pub async fn clone(url: &str, target: impl AsRef<Path>) -> Result<Self> {
        let target_path = target.as_ref();
        GitCommand::clone(url, target_path).execute_success().await?;
        Ok(Self::new(target_path))
    }

    /// Pulls from an explicit remote URL into the current branch.
    pub async fn pull(&self, remote: &str) -> Result<()> {
        GitCommand::pull(remote).current_dir(&self.path).execute_success().await
    }

    /// Checks out an existing branch.
    pub async fn checkout(&self, branch: &str) -> Result<()> {
        GitCommand::checkout(branch).current_dir(&self.path).execute_success().await
    }

    /// Creates and checks out a new branch.
    ///
    /// Fails if the branch already exists, which is how re-running an
    /// import of the same library and version is detected.
    pub async fn checkout_new_branch(&self, branch: &str) -> Result<()> {
        GitCommand::checkout_new_branch(branch).current_dir(&self.path).execute_success().await
    }

    /// Stages every change in the working tree.
    pub async fn stage_all(&self) -> Result<()> {
        GitCommand::add_all().current_dir(&self.path).execute_success().await
    }

    /// Commits staged changes with the given message.
    pub async fn commit(&self, message: &str) -> Result<()> {
        GitCommand::commit(message).current_dir(&self.path).execute_success().await
    }

    /// Returns the commit hash the repository's HEAD points at.
    pub async fn current_commit(&self) -> Result<String> {
        GitCommand::rev_parse("HEAD").current_dir(&self.path).execute_stdout().await
    }

    /// Returns the repository path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks whether the path looks like a git working tree.
    ///
    /// Git operations also work from subdirectories of a repository, so a
    /// `false` here does not necessarily mean commands will fail; it only
    /// means this directory itself is not a repository root.
    #[must_use]
    pub fn is_git_repo(&self) -> bool {
        self.path.join(".git").exists()
    }
}

/// Checks whether git can be invoked at all.
#[must_use]
pub fn is_git_installed() -> bool {
    std::process::Command::new(crate::utils::platform::get_git_command())
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Ensures git is available, or returns [`ImporterError::GitNotFound`].
pub fn ensure_git_available() -> Result<()> {
    if is_git_installed() { Ok(()) } else { Err(ImporterError::GitNotFound.into()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn init_repo(path: &Path) {
        GitCommand::new().args(["init", "-b", "master"]).current_dir(path).execute_success().await.unwrap();
        GitCommand::new()
            .args(["config", "user.email", "importer@example.test"])
            .current_dir(path)
            .execute_success()
            .await
            .unwrap();
        GitCommand::new()
            .args(["config", "user.name", "Importer Tests"])
            .current_dir(path)
            .execute_success()
            .await
            .unwrap();
    }

    #[test]
    fn git_is_installed_in_test_environment() {
        assert!(is_git_installed());
        assert!(ensure_git_available().is_ok());
    }

    #[tokio::test]
    async fn stage_commit_and_branch_round_trip() {
        let tmp = TempDir::new().unwrap();
        init_repo(tmp.path()).await;
        let repo = GitRepo::new(tmp.path());
        assert!(repo.is_git_repo());

        std::fs::write(tmp.path().join("file.txt"), "hello").unwrap();
        repo.stage_all().await.unwrap();
        repo.commit("Added file.txt").await.unwrap();
        assert_eq!(repo.current_commit().await.unwrap().len(), 40);

        repo.checkout_new_branch("importer-file-1.0.0").await.unwrap();
        // Creating the same branch again must fail
        let err = repo.checkout_new_branch("importer-file-1.0.0").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImporterError>(),
            Some(ImporterError::GitCheckoutFailed { .. })
        ));

        repo.checkout("master").await.unwrap();
    }

    #[tokio::test]
    async fn clone_of_local_repository_works() {
        let tmp = TempDir::new().unwrap();
        let upstream = tmp.path().join("upstream");
        std::fs::create_dir(&upstream).unwrap();
        init_repo(&upstream).await;
        std::fs::write(upstream.join("lib.js"), "x").unwrap();
        let repo = GitRepo::new(&upstream);
        repo.stage_all().await.unwrap();
        repo.commit("init").await.unwrap();

        let clone_path = tmp.path().join("clone");
        let clone = GitRepo::clone(&upstream.display().to_string(), &clone_path).await.unwrap();
        assert!(clone.is_git_repo());
        assert!(clone_path.join("lib.js").exists());
    }

    #[tokio::test]
    async fn clone_of_unreachable_url_fails() {
        let tmp = TempDir::new().unwrap();
        let err = GitRepo::clone(
            &tmp.path().join("does-not-exist").display().to_string(),
            tmp.path().join("clone"),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImporterError>(),
            Some(ImporterError::GitCloneFailed { .. })
        ));
    }
}
