//! Type-safe git command builder for consistent command execution.
//!
//! Provides a fluent API for building and executing git commands, ensuring
//! uniform error handling, logging, and timeout behavior across every
//! version-control operation the pipeline performs.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::ImporterError;
use crate::utils::platform::get_git_command;

/// Builder for constructing and executing git commands.
///
/// Commands run through the system `git` binary (like Cargo with
/// `git-fetch-with-cli`), so authentication, credential helpers, and user
/// configuration all behave exactly as they do on the command line.
///
/// New commands default to output capture and a 5 minute timeout, which
/// bounds hung network operations without interfering with large clones.
pub struct GitCommand {
    /// Arguments passed to git (e.g., `["clone", url, path]`)
    args: Vec<String>,

    /// Working directory, passed via `git -C` so the process cwd is untouched
    current_dir: Option<std::path::PathBuf>,

    /// Maximum duration to wait for completion (None = no timeout)
    timeout_duration: Option<Duration>,

    /// For clone commands, the URL is kept for better error messages
    clone_url: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            // Default timeout of 5 minutes for network-bound operations
            timeout_duration: Some(Duration::from_secs(300)),
            clone_url: None,
        }
    }
}

impl GitCommand {
    /// Creates a new git command builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory for command execution.
    ///
    /// The directory is passed with `git -C`, making the operation
    /// independent of the process's current directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set a custom timeout for the command (None for no timeout).
    #[must_use]
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Execute the command and return its captured output.
    ///
    /// Failures are mapped to the importer's typed errors: clone failures
    /// carry the URL, checkout failures carry the reference, and everything
    /// else becomes a [`ImporterError::GitCommandError`] with the operation
    /// name and stderr.
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let git_command = get_git_command();
        let mut cmd = Command::new(git_command);

        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.clone());

        cmd.args(&full_args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(target: "git", "Executing command: {} {}", git_command, full_args.join(" "));

        let output_future = cmd.output();
        let output = if let Some(duration) = self.timeout_duration {
            match timeout(duration, output_future).await {
                Ok(result) => {
                    result.context(format!("Failed to execute git {}", full_args.join(" ")))?
                }
                Err(_) => {
                    tracing::warn!(
                        target: "git",
                        "Command timed out after {} seconds: git {}",
                        duration.as_secs(),
                        full_args.join(" ")
                    );
                    return Err(ImporterError::GitCommandError {
                        operation: self.operation_name(&full_args),
                        stderr: format!(
                            "git command timed out after {} seconds: git {}",
                            duration.as_secs(),
                            full_args.join(" ")
                        ),
                    }
                    .into());
                }
            }
        } else {
            output_future.await.context(format!("Failed to execute git {}", full_args.join(" ")))?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();

            tracing::debug!(
                target: "git",
                "Command failed with exit code {:?}: {}",
                output.status.code(),
                if stderr.is_empty() { &stdout } else { &stderr }
            );

            let effective = self.effective_args(&full_args);
            let error = if effective.first().is_some_and(|arg| arg == "clone") {
                ImporterError::GitCloneFailed {
                    url: self.clone_url.unwrap_or_else(|| "unknown".to_string()),
                    reason: stderr,
                }
            } else if effective.first().is_some_and(|arg| arg == "checkout") {
                let reference =
                    effective.iter().skip(1).find(|a| !a.starts_with('-')).cloned().unwrap_or_default();
                ImporterError::GitCheckoutFailed { reference, reason: stderr }
            } else {
                ImporterError::GitCommandError {
                    operation: effective.first().cloned().unwrap_or_else(|| "unknown".to_string()),
                    stderr: if stderr.is_empty() { stdout } else { stderr },
                }
            };

            return Err(error.into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !stdout.is_empty() {
            tracing::debug!(target: "git", "{}", stdout.trim());
        }
        if !stderr.is_empty() {
            tracing::debug!(target: "git", "{}", stderr.trim());
        }

        Ok(GitCommandOutput { stdout, stderr })
    }

    /// Execute the command and return only stdout as a trimmed string.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Execute the command and check for success, discarding output.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }

    /// The git subcommand being run, skipping a leading `-C <dir>` pair.
    fn operation_name(&self, full_args: &[String]) -> String {
        self.effective_args(full_args).first().cloned().unwrap_or_else(|| "unknown".to_string())
    }

    fn effective_args<'a>(&self, full_args: &'a [String]) -> &'a [String] {
        if full_args.first().map(String::as_str) == Some("-C") && full_args.len() > 2 {
            &full_args[2..]
        } else {
            full_args
        }
    }
}

/// Output from a git command.
#[derive(Debug)]
pub struct GitCommandOutput {
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

// Convenience builders for the operations the pipeline performs.

impl GitCommand {
    /// Create a clone command targeting a directory.
    ///
    /// Remote URLs use a partial clone (`--filter=blob:none`) to keep
    /// transfers small; local paths need a full clone for the filter-less
    /// hardlink fast path to apply.
    pub fn clone(url: &str, target: impl AsRef<Path>) -> Self {
        let mut cmd = Self::new();
        let mut args = vec!["clone".to_string()];

        let is_local = url.starts_with("file://")
            || url.starts_with('/')
            || url.starts_with('.')
            || url.starts_with('~')
            || (url.len() > 1 && url.chars().nth(1) == Some(':')); // Windows paths like C:

        if !is_local {
            args.push("--filter=blob:none".to_string());
        }

        args.push(url.to_string());
        args.push(target.as_ref().display().to_string());

        cmd.args.extend(args);
        cmd.clone_url = Some(url.to_string());
        cmd
    }

    /// Create a pull command fetching from an explicit remote URL.
    pub fn pull(remote: &str) -> Self {
        Self::new().args(["pull", remote])
    }

    /// Create a checkout command for an existing reference.
    pub fn checkout(ref_name: &str) -> Self {
        Self::new().args(["checkout", ref_name])
    }

    /// Create a checkout command that creates a new branch.
    pub fn checkout_new_branch(branch_name: &str) -> Self {
        Self::new().args(["checkout", "-b", branch_name])
    }

    /// Create a command staging every change in the working tree.
    pub fn add_all() -> Self {
        Self::new().args(["add", "-A", "."])
    }

    /// Create a commit command with a message.
    pub fn commit(message: &str) -> Self {
        Self::new().args(["commit", "-m", message])
    }

    /// Create a rev-parse command.
    pub fn rev_parse(ref_name: &str) -> Self {
        Self::new().args(["rev-parse", ref_name])
    }
}
