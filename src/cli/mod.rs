//! Command-line interface for the cdnjs importer.
//!
//! The binary takes one or more upstream git URLs and imports each into
//! the local cdnjs repository:
//!
//! ```bash
//! # Import a single library
//! cdnjs-import --cdnjs ~/cdnjs https://github.com/example/lib.git
//!
//! # Import with an explicit source directory
//! cdnjs-import --cdnjs ~/cdnjs --dir /lib/out https://github.com/example/lib.git
//!
//! # Import several libraries concurrently
//! cdnjs-import --cdnjs ~/cdnjs https://a.test/x.git https://b.test/y.git
//! ```
//!
//! `--dir` and `--map` refine a single import and are rejected when more
//! than one URL is given.

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use colored::Colorize;
use std::path::PathBuf;

use crate::core::error::user_friendly_error;
use crate::descriptor::FileMapEntry;
use crate::importer::{CdnImporter, ImportRequest, ImporterOptions};

/// Logging verbosity, mirroring the `-v` count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// No log output (the default)
    #[default]
    Off,
    /// Errors only
    Error,
    /// Errors and warnings
    Warn,
    /// Stage-by-stage progress
    Info,
    /// Everything, including each git invocation
    Debug,
}

impl Verbosity {
    /// Maps a `-v` occurrence count to a verbosity level; 4 or more means
    /// [`Verbosity::Debug`].
    #[must_use]
    pub const fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Off,
            1 => Self::Error,
            2 => Self::Warn,
            3 => Self::Info,
            _ => Self::Debug,
        }
    }

    /// The `tracing` filter directive for this level, or `None` when off.
    #[must_use]
    pub const fn filter_directive(self) -> Option<&'static str> {
        match self {
            Self::Off => None,
            Self::Error => Some("error"),
            Self::Warn => Some("warn"),
            Self::Info => Some("info"),
            Self::Debug => Some("debug"),
        }
    }
}

/// Import third-party library releases into a local cdnjs repository.
#[derive(Debug, Parser)]
#[command(name = "cdnjs-import", version, about)]
pub struct Cli {
    /// Absolute path to the local cdnjs repository
    #[arg(long, env = "CDNJS_ROOT", value_name = "PATH")]
    cdnjs: PathBuf,

    /// Increase log verbosity (-v errors ... -vvvv everything)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Source directory inside the upstream tree (single library only)
    #[arg(long, value_name = "DIR")]
    dir: Option<String>,

    /// Auto-update file map as JSON, e.g. '[{"basePath":"/dist","files":["**/*"]}]'
    /// (single library only)
    #[arg(long, value_name = "JSON")]
    map: Option<String>,

    /// Remote the target repository is pulled from before importing
    #[arg(long, value_name = "URL")]
    remote: Option<String>,

    /// Upstream git URLs to import
    #[arg(required = true, value_name = "GIT_URL")]
    libs: Vec<String>,
}

impl Cli {
    /// The verbosity requested via `-v` flags.
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        Verbosity::from_count(self.verbose)
    }

    /// Runs the requested imports and reports per-library results.
    pub async fn execute(self) -> Result<()> {
        if (self.dir.is_some() || self.map.is_some()) && self.libs.len() != 1 {
            bail!("--dir and --map apply to a single library; pass one git URL");
        }

        let file_map = self
            .map
            .as_deref()
            .map(|raw| {
                serde_json::from_str::<Vec<FileMapEntry>>(raw)
                    .context("--map must be a JSON array of {basePath, files} entries")
            })
            .transpose()?;

        let requests: Vec<ImportRequest> = self
            .libs
            .iter()
            .map(|url| {
                let mut request = ImportRequest::new(url);
                request.dir = self.dir.clone();
                request.file_map = file_map.clone();
                request
            })
            .collect();

        let mut options = ImporterOptions::new(&self.cdnjs);
        if let Some(remote) = self.remote {
            options = options.with_remote(remote);
        }

        let importer = CdnImporter::new(&options)?;
        let report = importer.import_all(&requests).await;

        for outcome in report.succeeded() {
            println!(
                "{} {}@{} on branch {}",
                "imported".green().bold(),
                outcome.name,
                outcome.version,
                outcome.branch
            );
        }

        let mut failed = 0;
        for (request, error) in report.failed() {
            failed += 1;
            eprintln!("{} {}", "failed".red().bold(), request.git_url);
            match error.downcast_ref::<crate::core::ImporterError>() {
                Some(typed) => user_friendly_error(anyhow::Error::from(typed.clone())).display(),
                None => eprintln!("{}: {error:#}", "error".red().bold()),
            }
        }

        if failed > 0 {
            bail!("{failed} of {} imports failed", report.results.len());
        }
        Ok(())
    }
}
