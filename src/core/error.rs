//! Error handling for the cdnjs importer.
//!
//! The error system has two layers:
//! 1. [`ImporterError`] - strongly typed failures for every stage of the
//!    import pipeline, suitable for matching in code and in tests
//! 2. [`ErrorContext`] - a wrapper that adds a user-facing suggestion and
//!    details, rendered with colors by the CLI
//!
//! Errors produced inside the pipeline are propagated as [`anyhow::Error`]
//! with an [`ImporterError`] at the root where a typed failure exists. The
//! binary converts whatever bubbles up into an [`ErrorContext`] via
//! [`user_friendly_error`] before displaying it.
//!
//! # Error Categories
//!
//! - **Configuration**: [`ImporterError::LibraryRootMissing`] - the target
//!   repository does not have the expected `ajax/libs` structure
//! - **Git**: [`ImporterError::GitNotFound`], [`ImporterError::GitCommandError`],
//!   [`ImporterError::GitCloneFailed`], [`ImporterError::GitCheckoutFailed`]
//! - **Descriptor**: [`ImporterError::DescriptorMissing`],
//!   [`ImporterError::DescriptorParseError`], [`ImporterError::DescriptorInvalid`]
//! - **Resolution**: [`ImporterError::NoFilesMatched`]
//! - **Write**: [`ImporterError::FileSystemError`]

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for import operations.
///
/// Each variant corresponds to a failure mode of one pipeline stage. A
/// failed stage aborts the import that produced it; no rollback of earlier
/// stages is attempted, so destination writes that happened before the
/// failure remain on disk.
#[derive(Error, Debug, Clone)]
pub enum ImporterError {
    /// Git executable not found in PATH.
    #[error("git is not installed or not found in PATH")]
    GitNotFound,

    /// A git command returned a non-zero exit code.
    #[error("git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed (e.g., "pull", "commit")
        operation: String,
        /// The error output from the git command
        stderr: String,
    },

    /// Cloning the upstream repository failed.
    #[error("failed to clone repository: {url}")]
    GitCloneFailed {
        /// The repository URL that could not be cloned
        url: String,
        /// The error output from git
        reason: String,
    },

    /// A checkout in the target repository failed.
    #[error("failed to checkout '{reference}': {reason}")]
    GitCheckoutFailed {
        /// The branch that could not be checked out
        reference: String,
        /// The error output from git
        reason: String,
    },

    /// The target repository does not contain the library storage subpath.
    ///
    /// Raised at construction, before any network or filesystem mutation.
    #[error("the cdnjs library directory doesn't exist: {path}")]
    LibraryRootMissing {
        /// The missing `<root>/ajax/libs` path
        path: String,
    },

    /// The upstream repository has no `package.json` at its root.
    ///
    /// There is no fallback to a package registry; repositories without
    /// machine-readable metadata are rejected.
    #[error("package.json is required: {path}")]
    DescriptorMissing {
        /// Where the descriptor was expected
        path: String,
    },

    /// The upstream `package.json` could not be read or parsed.
    #[error("failed to read the package.json file: {reason}")]
    DescriptorParseError {
        /// Path of the offending descriptor
        path: String,
        /// Parse or I/O failure description
        reason: String,
    },

    /// The descriptor parsed but is missing a required field.
    #[error("invalid package.json: {reason}")]
    DescriptorInvalid {
        /// What is wrong with the descriptor
        reason: String,
    },

    /// The file map pattern matched nothing in the upstream clone.
    #[error("no library files matched pattern: {pattern}")]
    NoFilesMatched {
        /// The composed glob pattern that produced zero matches
        pattern: String,
    },

    /// A destination directory, metadata, or copy operation failed.
    #[error("file system error during {operation}: {path}")]
    FileSystemError {
        /// The operation that failed (e.g., "copy", "create directory")
        operation: String,
        /// The path involved
        path: String,
    },

    /// Catch-all for errors without a dedicated variant.
    #[error("{message}")]
    Other {
        /// The error description
        message: String,
    },
}

/// An [`ImporterError`] enriched with a user-facing suggestion and details.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying importer error
    pub error: ImporterError,
    /// Optional actionable suggestion, shown in green
    pub suggestion: Option<String>,
    /// Optional extra context, shown in yellow
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: ImporterError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add an actionable suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining why the error occurred.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details, and suggestion to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognizes [`ImporterError`] variants and attaches tailored suggestions;
/// everything else is rendered with its full cause chain so nothing is lost
/// between the failing stage and the terminal.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(importer_error) = error.downcast_ref::<ImporterError>() {
        return create_error_context(importer_error.clone());
    }

    // Generic error: include the cause chain for diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(ImporterError::Other { message })
}

/// Map each [`ImporterError`] variant to a context with tailored guidance.
fn create_error_context(error: ImporterError) -> ErrorContext {
    match &error {
        ImporterError::GitNotFound => ErrorContext::new(error.clone())
            .with_suggestion(
                "Install git from https://git-scm.com/ or your package manager \
                 (e.g., 'brew install git', 'apt install git')",
            )
            .with_details("The importer shells out to git for all repository operations"),

        ImporterError::GitCommandError { operation, stderr } => {
            let suggestion = match operation.as_str() {
                "pull" => "Check your internet connection and that the target repository has a configured upstream",
                "commit" => "Check that git user.name and user.email are configured in the target repository",
                _ => "Run the failing git command manually in the target repository for more detail",
            };
            ErrorContext::new(error.clone()).with_suggestion(suggestion).with_details(stderr.clone())
        }

        ImporterError::GitCloneFailed { reason, .. } => ErrorContext::new(error.clone())
            .with_suggestion(
                "Check the git URL and your internet connection. Verify you have access to the repository",
            )
            .with_details(reason.clone()),

        ImporterError::GitCheckoutFailed { reference, reason } => {
            let suggestion = if reference.starts_with(crate::constants::BRANCH_PREFIX) {
                "A branch for this library and version already exists; the import may have run before"
            } else {
                "Verify the branch exists in the target repository"
            };
            ErrorContext::new(error.clone()).with_suggestion(suggestion).with_details(reason.clone())
        }

        ImporterError::LibraryRootMissing { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Point --cdnjs at a local clone of the cdnjs repository")
            .with_details("The target repository must contain an ajax/libs directory"),

        ImporterError::DescriptorMissing { .. } => ErrorContext::new(error.clone())
            .with_suggestion("The upstream repository must ship a package.json at its root")
            .with_details("Repositories without machine-readable package metadata cannot be imported"),

        ImporterError::NoFilesMatched { .. } => ErrorContext::new(error.clone()).with_suggestion(
            "Pass an explicit --dir or --map pointing at the directory that holds the distributable files",
        ),

        _ => ErrorContext::new(error.clone()),
    }
}
